//! Per-function control-flow graph with petgraph
//!
//! Nodes are block labels (`loop.header3`), edges carry the edge kind.
//! Used for DOT export and reachability queries on a finished program.

use crate::features::ssa::domain::{BlockId, FunctionId, Program, Terminator};
use ahash::AHashMap;
use petgraph::algo::is_cyclic_directed;
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;

pub struct FunctionCfg {
    /// Directed graph: block → successor
    graph: DiGraph<String, &'static str>,

    /// Block → node index mapping
    block_to_node: AHashMap<BlockId, NodeIndex>,

    /// Node of the entry block
    entry: Option<NodeIndex>,
}

impl FunctionCfg {
    pub fn build(program: &Program, function: FunctionId) -> Self {
        let record = program.function(function);
        let mut graph = DiGraph::new();
        let mut block_to_node = AHashMap::new();

        for block_id in &record.blocks {
            let idx = graph.add_node(program.block(*block_id).label());
            block_to_node.insert(*block_id, idx);
        }

        for block_id in &record.blocks {
            let block = program.block(*block_id);
            let from = block_to_node[block_id];
            let kind = match block.terminator {
                Some(Terminator::Jump(_)) => "jump",
                Some(Terminator::Branch { .. }) => "branch",
                Some(Terminator::Return(_)) => "return",
                Some(Terminator::Try { .. }) => "try",
                Some(Terminator::Dispatch(_)) => "finally",
                None => "fallthrough",
            };
            for succ in &block.succs {
                if let Some(&to) = block_to_node.get(succ) {
                    graph.add_edge(from, to, kind);
                }
            }
        }

        Self {
            entry: block_to_node.get(&record.entry).copied(),
            graph,
            block_to_node,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Graphviz source, edge labels included
    pub fn to_dot(&self) -> String {
        format!("{:?}", Dot::with_config(&self.graph, &[Config::GraphContentOnly]))
            .lines()
            .fold(String::from("digraph {\n"), |mut out, line| {
                out.push_str(line);
                out.push('\n');
                out
            })
            + "}\n"
    }

    /// Blocks no path from the entry reaches
    pub fn unreachable_blocks(&self) -> Vec<BlockId> {
        let Some(entry) = self.entry else {
            return Vec::new();
        };
        let mut seen = vec![false; self.graph.node_count()];
        let mut dfs = Dfs::new(&self.graph, entry);
        while let Some(idx) = dfs.next(&self.graph) {
            seen[idx.index()] = true;
        }
        let mut blocks: Vec<BlockId> = self
            .block_to_node
            .iter()
            .filter(|(_, idx)| !seen[idx.index()])
            .map(|(block, _)| *block)
            .collect();
        blocks.sort();
        blocks
    }

    /// Whether the function contains a loop
    pub fn has_cycle(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }
}

impl Program {
    pub fn function_cfg(&self, function: FunctionId) -> FunctionCfg {
        FunctionCfg::build(self, function)
    }

    /// DOT export of one function's CFG
    pub fn to_dot(&self, function: FunctionId) -> String {
        self.function_cfg(function).to_dot()
    }
}

#[cfg(test)]
mod tests {
    use crate::config::BuildConfig;
    use crate::features::ssa::domain::Literal;
    use crate::features::ssa::infrastructure::{LoopBuilder, ModuleSpec, SsaBuilder};
    use crate::shared::ports::Language;

    #[test]
    fn test_loop_cfg_has_cycle_and_dot() {
        let mut b = SsaBuilder::new(BuildConfig::default());
        let main = b.build_module(ModuleSpec::new("t.js", Language::JavaScript), |b| {
            LoopBuilder::new()
                .set_condition(|b| b.read_value("c"))
                .set_body(|b| {
                    b.emit_const(Literal::Int(1));
                })
                .build(b);
        });
        let program = b.finish();
        let cfg = program.function_cfg(main);
        assert!(cfg.has_cycle());
        let dot = program.to_dot(main);
        assert!(dot.starts_with("digraph {"));
        assert!(dot.contains("loop.header"));
    }

    #[test]
    fn test_unreachable_blocks_after_return() {
        let mut b = SsaBuilder::new(BuildConfig::default());
        let main = b.build_module(ModuleSpec::new("t.js", Language::JavaScript), |b| {
            b.emit_return(vec![]);
            b.emit_const(Literal::Int(1));
        });
        let program = b.finish();
        let cfg = program.function_cfg(main);
        let dead: Vec<String> = cfg
            .unreachable_blocks()
            .into_iter()
            .map(|id| program.block(id).name.clone())
            .collect();
        assert_eq!(dead, vec!["unreachable".to_string()]);
        assert!(!cfg.has_cycle());
    }
}
