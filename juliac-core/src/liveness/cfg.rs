//! Control-flow graph construction and the live-variable dataflow
//! fixpoint.

use std::collections::BTreeSet;

use juliac_parser::ast::{Atom, Call, Expression, Function, FunctionBody, Instruction, MainFunction};

use crate::symtab::FunctionSymbol;

/// One basic step: the variables written (`def`) and read (`use`) at
/// this point, each in first-occurrence order — the order graph
/// coloring later assigns registers in depends on it.
#[derive(Debug, Clone, Default)]
pub struct CfNode {
    pub id: usize,
    pub def: Vec<String>,
    pub uses: Vec<String>,
}

/// A function's control-flow graph: nodes plus directed successor
/// edges, added in AST order. The entry node always has id 0.
#[derive(Debug, Default)]
pub struct CfGraph {
    pub nodes: Vec<CfNode>,
    pub successors: Vec<BTreeSet<usize>>,
}

impl CfGraph {
    fn add_node(&mut self, def: Vec<String>, uses: Vec<String>) -> usize {
        let id = self.nodes.len();
        self.nodes.push(CfNode { id, def, uses });
        self.successors.push(BTreeSet::new());
        id
    }

    fn add_edge(&mut self, from: usize, to: usize) {
        self.successors[from].insert(to);
    }

    /// Standard reverse live-variable dataflow, iterated to a fixpoint:
    /// `live_in(n) = use(n) ∪ (live_out(n) \ def(n))`,
    /// `live_out(n) = ⋃ live_in(s)` over successors `s`.
    pub fn solve_live_in(&self) -> Vec<BTreeSet<String>> {
        let mut live_in = vec![BTreeSet::new(); self.nodes.len()];
        let mut iter_count = 0usize;
        loop {
            iter_count += 1;
            if iter_count % 1000 == 0 {
                eprintln!("DEBUG solve_live_in iter={}", iter_count);
            }
            if iter_count > 2_000_000 {
                panic!("DEBUG solve_live_in did not converge after {} iterations", iter_count);
            }
            let mut changed = false;
            for node in self.nodes.iter().rev() {
                let mut live_out = BTreeSet::new();
                for &succ in &self.successors[node.id] {
                    live_out.extend(live_in[succ].iter().cloned());
                }
                let mut new_in: BTreeSet<String> = node.uses.iter().cloned().collect();
                for var in &live_out {
                    if !node.def.contains(var) {
                        new_in.insert(var.clone());
                    }
                }
                if new_in != live_in[node.id] {
                    live_in[node.id] = new_in;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        live_in
    }
}

/// Builds the CFG for a function body, given its already-resolved
/// parameter list (the entry node's defs).
pub fn build_function(function: &Function, symbol: &FunctionSymbol) -> CfGraph {
    let params: Vec<String> = function.params.iter().map(|p| p.name.clone()).collect();
    build(&function.body, params, symbol)
}

pub fn build_main(main: &MainFunction, symbol: &FunctionSymbol) -> CfGraph {
    build(&main.body, Vec::new(), symbol)
}

fn build(body: &FunctionBody, entry_defs: Vec<String>, _symbol: &FunctionSymbol) -> CfGraph {
    let mut cfg = CfGraph::default();
    let entry = cfg.add_node(entry_defs, Vec::new());
    let mut last = entry;

    for decl in &body.declarations {
        let node = cfg.add_node(vec![decl.name.clone()], free_vars(&decl.value));
        cfg.add_edge(last, node);
        last = node;
    }

    build_instructions(&mut cfg, &body.instructions, last);
    cfg
}

/// Appends the CFG for a statement list after `entry`, returning the
/// set of "tail" node ids instructions after this block should link
/// from — empty if the block always ends in `return`.
fn build_instructions(cfg: &mut CfGraph, instructions: &[Instruction], entry: usize) -> Vec<usize> {
    let mut tails = vec![entry];

    for instruction in instructions {
        if tails.is_empty() {
            // Unreachable code after an unconditional return; the
            // liveness model has nothing to link it from, so later
            // instructions are analyzed in isolation.
            tails.push(cfg.add_node(Vec::new(), Vec::new()));
        }

        tails = build_instruction(cfg, instruction, tails);
    }

    tails
}

fn build_instruction(cfg: &mut CfGraph, instruction: &Instruction, preds: Vec<usize>) -> Vec<usize> {
    match instruction {
        Instruction::Assignment { name, value, .. } => {
            let node = cfg.add_node(vec![name.clone()], free_vars(value));
            for pred in preds {
                cfg.add_edge(pred, node);
            }
            vec![node]
        }
        Instruction::Block { instructions, .. } => {
            let mut entry_tails = preds;
            let mut result = Vec::new();
            for i in instructions {
                entry_tails = build_instruction(cfg, i, entry_tails);
            }
            result.extend(entry_tails);
            result
        }
        Instruction::Print { value, .. } => {
            let uses = value.as_ref().map(free_vars).unwrap_or_default();
            let node = cfg.add_node(Vec::new(), uses);
            for pred in preds {
                cfg.add_edge(pred, node);
            }
            vec![node]
        }
        Instruction::CallStatement { call, .. } => {
            let node = cfg.add_node(Vec::new(), call_free_vars(call));
            for pred in preds {
                cfg.add_edge(pred, node);
            }
            vec![node]
        }
        Instruction::Return { value, .. } => {
            let uses = value.as_ref().map(free_vars).unwrap_or_default();
            let node = cfg.add_node(Vec::new(), uses);
            for pred in preds {
                cfg.add_edge(pred, node);
            }
            // A return is a sink: nothing in this block falls through
            // past it, resolving the merge-node ambiguity in favor of
            // "only join branches that fall through".
            Vec::new()
        }
        Instruction::If {
            condition,
            then_branch,
            else_branch,
            ..
        } => {
            let header = cfg.add_node(Vec::new(), free_vars(condition));
            for pred in preds {
                cfg.add_edge(pred, header);
            }

            let then_tails = build_instructions(cfg, then_branch, header);
            let else_tails = match else_branch {
                Some(else_branch) => build_instructions(cfg, else_branch, header),
                None => vec![header],
            };

            let mut joined = then_tails;
            joined.extend(else_tails);
            joined
        }
        Instruction::While { condition, body, .. } => {
            let header = cfg.add_node(Vec::new(), free_vars(condition));
            for pred in preds {
                cfg.add_edge(pred, header);
            }

            let body_tails = build_instructions(cfg, body, header);
            for tail in body_tails {
                cfg.add_edge(tail, header);
            }

            // The loop header also flows forward past the loop.
            vec![header]
        }
    }
}

fn free_vars(expr: &Expression) -> Vec<String> {
    let mut vars = Vec::new();
    collect_free_vars(expr, &mut vars);
    vars
}

fn collect_free_vars(expr: &Expression, out: &mut Vec<String>) {
    match expr {
        Expression::Unary { operand, .. } => collect_free_vars(operand, out),
        Expression::Binary { left, right, .. } => {
            collect_free_vars(left, out);
            collect_free_vars(right, out);
        }
        Expression::Call(call) => {
            for arg in &call.args {
                collect_free_vars(arg, out);
            }
        }
        Expression::Atom(atom) => collect_atom_free_vars(atom, out),
    }
}

fn collect_atom_free_vars(atom: &Atom, out: &mut Vec<String>) {
    match atom {
        Atom::Identifier { name, .. } => push_unique(out, name.clone()),
        Atom::Paren { inner, .. } => collect_free_vars(inner, out),
        Atom::IntLiteral { .. }
        | Atom::FloatLiteral { .. }
        | Atom::BoolLiteral { .. }
        | Atom::StringLiteral { .. } => {}
    }
}

fn call_free_vars(call: &Call) -> Vec<String> {
    let mut vars = Vec::new();
    for arg in &call.args {
        collect_free_vars(arg, &mut vars);
    }
    vars
}

fn push_unique(out: &mut Vec<String>, name: String) {
    if !out.contains(&name) {
        out.push(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use juliac_parser::parse;

    fn cfg_for(src: &str) -> CfGraph {
        let program = parse(src).unwrap();
        let resolved = crate::resolve::resolve(&program);
        let symbol = resolved.symbols.get("main").unwrap().clone();
        build_main(&program.main, &symbol)
    }

    #[test]
    fn straight_line_chains_nodes() {
        let cfg = cfg_for("function main() x::Integer = 1 y::Integer = x println(y) end");
        assert!(cfg.nodes.len() >= 3);
        for i in 0..cfg.nodes.len() - 1 {
            assert!(cfg.successors[i].contains(&(i + 1)));
        }
    }

    #[test]
    fn live_in_converges_and_is_stable() {
        let cfg = cfg_for("function main() x::Integer = 1 println(x) end");
        let first = cfg.solve_live_in();
        let second = cfg.solve_live_in();
        assert_eq!(first, second);
    }

    #[test]
    fn while_loop_back_edge_keeps_condition_variable_live() {
        let cfg = cfg_for(
            "function main() x::Integer = 0 while x < 3 x = x + 1 end println(x) end",
        );
        let live_in = cfg.solve_live_in();
        // `x` must be live at the loop header on every iteration.
        let header = cfg
            .nodes
            .iter()
            .find(|n| n.uses.iter().any(|v| v == "x") && n.def.is_empty())
            .expect("while header node");
        assert!(live_in[header.id].contains("x"));
    }
}
