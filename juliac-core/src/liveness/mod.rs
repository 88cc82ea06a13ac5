//! Liveness analysis: control-flow graph, live-variable dataflow, and
//! register-interference coloring, reported per function.

pub mod cfg;
pub mod rig;

use juliac_parser::ast::Program;

use crate::symtab::SymbolTable;

/// One function's liveness report, ready to print in the format
/// described by the CLI's `-liveness` mode.
pub struct FunctionReport {
    pub name: String,
    pub registers: usize,
    graph_dump: String,
    cfg_dump: String,
}

impl FunctionReport {
    /// `Function: <name>` / `Registers: <k>` / interference-graph dump.
    pub fn render(&self) -> String {
        format!(
            "Function: {}\nRegisters: {}\n{}",
            self.name, self.registers, self.graph_dump
        )
    }

    /// Per-function CFG dump used only under `-debug`.
    pub fn render_cfg(&self) -> &str {
        &self.cfg_dump
    }
}

/// Runs liveness analysis over every function in `program`, in
/// declaration order with `main` last, matching the order functions
/// appear in the symbol table.
pub fn analyze(program: &Program, symbols: &SymbolTable) -> Vec<FunctionReport> {
    let mut reports = Vec::new();

    for function in &program.functions {
        let Some(symbol) = symbols.get(&function.name) else {
            continue;
        };
        let graph = cfg::build_function(function, symbol);
        reports.push(report_for(&function.name, &graph));
    }

    if let Some(symbol) = symbols.get("main") {
        let graph = cfg::build_main(&program.main, symbol);
        reports.push(report_for("main", &graph));
    }

    reports
}

fn report_for(name: &str, graph: &cfg::CfGraph) -> FunctionReport {
    let (ri_graph, registers, coloring) = rig::analyze(graph);

    let mut graph_dump = String::new();
    for var in &ri_graph.variables {
        let mut neighbors: Vec<&String> = ri_graph.neighbors(var).iter().collect();
        neighbors.sort();
        let neighbor_list = neighbors
            .iter()
            .map(|n| n.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let color = coloring.get(var).copied().unwrap_or(0);
        graph_dump.push_str(&format!(
            "  {var} (color {color}): [{neighbor_list}]\n"
        ));
    }

    let mut cfg_dump = String::new();
    for node in &graph.nodes {
        let mut succs: Vec<String> = graph.successors[node.id].iter().map(|s| s.to_string()).collect();
        succs.sort();
        cfg_dump.push_str(&format!(
            "  node {}: def={{{}}} use={{{}}} -> [{}]\n",
            node.id,
            node.def.iter().cloned().collect::<Vec<_>>().join(", "),
            node.uses.iter().cloned().collect::<Vec<_>>().join(", "),
            succs.join(", "),
        ));
    }

    FunctionReport {
        name: name.to_string(),
        registers,
        graph_dump,
        cfg_dump,
    }
}
