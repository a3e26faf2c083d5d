//! # Computation Graph Traversal
//!
//! The computation graph is defined implicitly: each gradient-tracked tensor
//! links to its creating operation through `grad_fn`, and each operation
//! links back to its input tensors. `topological_sort` walks that structure
//! from the tensor a backward pass starts on and returns every reachable
//! node in post order, which is what the backward driver consumes.

use std::collections::HashSet;
use std::sync::{Arc, RwLock, Weak};

use crate::error::FerrogradError;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;

/// Stable identity of a node in the computation graph.
///
/// The pointer to the `RwLock<TensorData>` inside a tensor's `Arc` identifies
/// the node even when `Tensor` handles are cloned or dropped. It is only ever
/// used as a map key, never dereferenced.
pub type NodeId = *const RwLock<TensorData>;

/// Performs a depth-first post-order traversal of the graph reachable from
/// `root`.
///
/// The returned vector holds strong handles to every visited node, leaves
/// first and `root` last. Iterating it in reverse therefore guarantees that a
/// node is processed only after every node that consumes its output, which is
/// the order gradient accumulation requires. Each node appears exactly once,
/// so operations feeding several consumers are still dispatched a single
/// time, with their consumers' contributions already summed.
///
/// Robustness during the walk:
/// - an expired operation link makes the node a leaf for traversal purposes;
/// - an expired input edge is logged and pruned;
/// - an operation listing its own output among its inputs is skipped at that
///   edge rather than recursed into;
/// - any genuine cycle is reported as [`FerrogradError::CycleDetected`].
pub fn topological_sort(root: &Tensor) -> Result<Vec<Arc<RwLock<TensorData>>>, FerrogradError> {
    let mut sorted_nodes = Vec::new();
    let mut visited = HashSet::new(); // Nodes for which DFS has completed
    let mut recursion_stack = HashSet::new(); // Nodes on the current DFS path
    dfs(
        Arc::clone(&root.data),
        &mut visited,
        &mut recursion_stack,
        &mut sorted_nodes,
    )?;
    Ok(sorted_nodes)
}

fn dfs(
    node: Arc<RwLock<TensorData>>,
    visited: &mut HashSet<NodeId>,
    recursion_stack: &mut HashSet<NodeId>,
    sorted_nodes: &mut Vec<Arc<RwLock<TensorData>>>,
) -> Result<(), FerrogradError> {
    let node_id: NodeId = Arc::as_ptr(&node);
    if visited.contains(&node_id) {
        return Ok(());
    }
    if recursion_stack.contains(&node_id) {
        return Err(FerrogradError::CycleDetected);
    }
    recursion_stack.insert(node_id);

    let grad_fn = node
        .read()
        .map_err(|_| {
            FerrogradError::InternalError("tensor lock poisoned during graph traversal".to_string())
        })?
        .grad_fn
        .clone();
    if let Some(op) = grad_fn.as_ref().and_then(Weak::upgrade) {
        for parent in op.inputs() {
            let Some(parent) = parent.upgrade() else {
                log::warn!(
                    "graph traversal: {}",
                    FerrogradError::ExpiredReference {
                        operation: format!("input edge of {:?}", op),
                    }
                );
                continue;
            };
            if Arc::as_ptr(&parent) == node_id {
                // An operation must never be re-entered with its own output.
                continue;
            }
            dfs(parent, visited, recursion_stack, sorted_nodes)?;
        }
    }

    recursion_stack.remove(&node_id);
    visited.insert(node_id);
    sorted_nodes.push(node);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::backward_op::{BackwardOp, NodeRef};
    use crate::error::FerrogradError;

    // Minimal operation used to wire graphs by hand.
    #[derive(Debug)]
    struct MockOp {
        parents: Vec<NodeRef>,
    }

    impl BackwardOp for MockOp {
        fn backward(&self, _upstream: &Tensor) -> Result<Vec<Option<Tensor>>, FerrogradError> {
            Ok(vec![None; self.parents.len()])
        }
        fn inputs(&self) -> Vec<NodeRef> {
            self.parents.clone()
        }
    }

    fn leaf() -> Tensor {
        let t = Tensor::scalar(0.0);
        t.requires_grad_(true).unwrap();
        t
    }

    // Wires `child = op(parents...)`, returning the op so the caller keeps it
    // alive (in real code the arena owns it).
    fn wire(child: &Tensor, parents: &[&Tensor]) -> Arc<dyn BackwardOp + Send + Sync> {
        let op: Arc<dyn BackwardOp + Send + Sync> = Arc::new(MockOp {
            parents: parents.iter().map(|p| p.node_ref()).collect(),
        });
        child.requires_grad_(true).unwrap();
        child.set_grad_fn(&op).unwrap();
        op
    }

    fn node_id(t: &Tensor) -> NodeId {
        Arc::as_ptr(&t.data)
    }

    #[test]
    fn test_topological_sort_linear() {
        let t1 = leaf();
        let t2 = leaf();
        let t3 = Tensor::scalar(0.0);
        let _op3 = wire(&t3, &[&t1, &t2]);
        let t4 = Tensor::scalar(0.0);
        let _op4 = wire(&t4, &[&t3]);

        let order = topological_sort(&t4).unwrap();
        assert_eq!(order.len(), 4);
        let pos = |t: &Tensor| {
            order
                .iter()
                .position(|n| Arc::as_ptr(n) == node_id(t))
                .unwrap()
        };
        assert!(pos(&t1) < pos(&t3));
        assert!(pos(&t2) < pos(&t3));
        assert!(pos(&t3) < pos(&t4));
        assert_eq!(pos(&t4), 3);
    }

    #[test]
    fn test_topological_sort_shared_parent_visited_once() {
        let t1 = leaf();
        let t3 = Tensor::scalar(0.0);
        let _op3 = wire(&t3, &[&t1]);
        let t4 = Tensor::scalar(0.0);
        let _op4 = wire(&t4, &[&t1]);
        let t5 = Tensor::scalar(0.0);
        let _op5 = wire(&t5, &[&t3, &t4]);

        let order = topological_sort(&t5).unwrap();
        assert_eq!(order.len(), 4);
        let shared = order
            .iter()
            .filter(|n| Arc::as_ptr(n) == node_id(&t1))
            .count();
        assert_eq!(shared, 1);
    }

    #[test]
    fn test_topological_sort_cycle() {
        let t2 = Tensor::scalar(0.0);
        let t3 = Tensor::scalar(0.0);
        let op3 = wire(&t3, &[&t2]);
        let op2 = wire(&t2, &[&t3]);

        let result = topological_sort(&t3);
        assert!(matches!(result, Err(FerrogradError::CycleDetected)));
        drop((op2, op3));
    }

    #[test]
    fn test_topological_sort_self_edge_is_skipped() {
        let t = Tensor::scalar(0.0);
        let _op = wire(&t, &[&t]);

        let order = topological_sort(&t).unwrap();
        assert_eq!(order.len(), 1);
    }

    #[test]
    fn test_topological_sort_expired_parent_is_pruned() {
        let t3 = Tensor::scalar(0.0);
        let op = {
            let t1 = leaf();
            wire(&t3, &[&t1])
            // t1 dropped here, its node expires
        };
        let order = topological_sort(&t3).unwrap();
        assert_eq!(order.len(), 1);
        drop(op);
    }

    #[test]
    fn test_topological_sort_single_node() {
        let t1 = leaf();
        let order = topological_sort(&t1).unwrap();
        assert_eq!(order.len(), 1);
        assert_eq!(Arc::as_ptr(&order[0]), node_id(&t1));
    }
}
