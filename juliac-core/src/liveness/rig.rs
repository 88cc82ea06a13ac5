//! Register interference graph construction and coloring.

use std::collections::{BTreeSet, HashMap};

use super::cfg::CfGraph;

/// Above this size (nodes or candidate color count) exact brute-force
/// coloring is skipped in favor of the greedy upper bound, bounding the
/// `k^n` search the brute force would otherwise perform.
const BRUTE_FORCE_NODE_LIMIT: usize = 7;
const BRUTE_FORCE_COLOR_LIMIT: usize = 7;

/// An undirected graph over local-variable names, with edges for every
/// pair that co-occurs in some live set of size >= 2.
#[derive(Debug)]
pub struct RiGraph {
    pub variables: Vec<String>,
    adjacency: HashMap<String, BTreeSet<String>>,
}

impl RiGraph {
    pub fn from_live_sets(variables: &[String], live_sets: &[BTreeSet<String>]) -> Self {
        let mut adjacency: HashMap<String, BTreeSet<String>> =
            variables.iter().map(|v| (v.clone(), BTreeSet::new())).collect();

        for live in live_sets {
            let live: Vec<&String> = live.iter().filter(|v| adjacency.contains_key(*v)).collect();
            for i in 0..live.len() {
                for j in (i + 1)..live.len() {
                    if live[i] != live[j] {
                        adjacency.get_mut(live[i]).unwrap().insert(live[j].clone());
                        adjacency.get_mut(live[j]).unwrap().insert(live[i].clone());
                    }
                }
            }
        }

        Self {
            variables: variables.to_vec(),
            adjacency,
        }
    }

    pub fn neighbors(&self, var: &str) -> &BTreeSet<String> {
        &self.adjacency[var]
    }

    /// Greedy coloring in insertion order: each variable gets the
    /// smallest color not already used by a colored neighbor.
    pub fn greedy_coloring(&self) -> HashMap<String, usize> {
        let mut colors: HashMap<String, usize> = HashMap::new();
        for var in &self.variables {
            let used: BTreeSet<usize> = self
                .neighbors(var)
                .iter()
                .filter_map(|n| colors.get(n).copied())
                .collect();
            let color = (0..).find(|c| !used.contains(c)).unwrap();
            colors.insert(var.clone(), color);
        }
        colors
    }

    /// Largest clique found by Bron-Kerbosch with pivoting; a lower
    /// bound on the chromatic number.
    pub fn clique_number(&self) -> usize {
        let mut best = 0;
        let all: BTreeSet<String> = self.variables.iter().cloned().collect();
        self.bron_kerbosch(BTreeSet::new(), all, BTreeSet::new(), &mut best);
        best.max(if self.variables.is_empty() { 0 } else { 1 })
    }

    fn bron_kerbosch(
        &self,
        r: BTreeSet<String>,
        mut p: BTreeSet<String>,
        mut x: BTreeSet<String>,
        best: &mut usize,
    ) {
        if p.is_empty() && x.is_empty() {
            *best = (*best).max(r.len());
            return;
        }

        let pivot = p.union(&x).next().cloned();
        let candidates: Vec<String> = match &pivot {
            Some(pivot) => p.difference(self.neighbors(pivot)).cloned().collect(),
            None => p.iter().cloned().collect(),
        };

        for v in candidates {
            let neighbors = self.neighbors(&v).clone();
            let mut next_r = r.clone();
            next_r.insert(v.clone());
            let next_p: BTreeSet<String> = p.intersection(&neighbors).cloned().collect();
            let next_x: BTreeSet<String> = x.intersection(&neighbors).cloned().collect();
            self.bron_kerbosch(next_r, next_p, next_x, best);
            p.remove(&v);
            x.insert(v);
        }
    }

    fn is_valid_coloring(&self, coloring: &HashMap<String, usize>) -> bool {
        for var in &self.variables {
            let Some(&color) = coloring.get(var) else {
                return false;
            };
            if self
                .neighbors(var)
                .iter()
                .any(|n| coloring.get(n) == Some(&color))
            {
                return false;
            }
        }
        true
    }

    /// Tries every `k`-coloring by brute force for `lower..upper`,
    /// returning the first valid one found, or the greedy coloring if
    /// the search space is too large or nothing smaller than `upper`
    /// works.
    pub fn chromatic_number(&self) -> (usize, HashMap<String, usize>) {
        let greedy = self.greedy_coloring();
        let upper = greedy.values().copied().max().map(|m| m + 1).unwrap_or(0);
        if self.variables.is_empty() {
            return (0, greedy);
        }

        let lower = self.clique_number();
        eprintln!("DEBUG chromatic_number: lower={} upper={} vars={}", lower, upper, self.variables.len());
        if self.variables.len() > BRUTE_FORCE_NODE_LIMIT || upper > BRUTE_FORCE_COLOR_LIMIT {
            return (upper, greedy);
        }

        for k in lower..upper {
            if let Some(coloring) = self.try_k_coloring(k) {
                return (k.max(1), coloring);
            }
        }
        (upper, greedy)
    }

    fn try_k_coloring(&self, k: usize) -> Option<HashMap<String, usize>> {
        if k == 0 {
            return None;
        }
        let mut assignment = vec![0usize; self.variables.len()];
        loop {
            let coloring: HashMap<String, usize> = self
                .variables
                .iter()
                .cloned()
                .zip(assignment.iter().copied())
                .collect();
            if self.is_valid_coloring(&coloring) {
                return Some(coloring);
            }
            if !increment(&mut assignment, k) {
                return None;
            }
        }
    }
}

/// Increments `assignment` as a base-`k` counter; returns `false` on
/// overflow (every combination has been tried).
fn increment(assignment: &mut [usize], k: usize) -> bool {
    for digit in assignment.iter_mut() {
        *digit += 1;
        if *digit < k {
            return true;
        }
        *digit = 0;
    }
    false
}

/// Builds the interference graph for a function's CFG and computes its
/// chromatic number, the minimum register count reported for that
/// function.
pub fn analyze(cfg: &CfGraph) -> (RiGraph, usize, HashMap<String, usize>) {
    eprintln!("DEBUG analyze: nodes={}", cfg.nodes.len());
    let mut variables: Vec<String> = Vec::new();
    for node in &cfg.nodes {
        for var in node.def.iter().chain(node.uses.iter()) {
            if !variables.contains(var) {
                variables.push(var.clone());
            }
        }
    }

    let live_sets = cfg.solve_live_in();
    let rig = RiGraph::from_live_sets(&variables, &live_sets);
    let (k, coloring) = rig.chromatic_number();
    (rig, k, coloring)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::liveness::cfg::build_main;
    use juliac_parser::parse;

    fn analyze_main(src: &str) -> (RiGraph, usize, HashMap<String, usize>) {
        let program = parse(src).unwrap();
        let resolved = crate::resolve::resolve(&program);
        let symbol = resolved.symbols.get("main").unwrap().clone();
        let cfg = build_main(&program.main, &symbol);
        analyze(&cfg)
    }

    #[test]
    fn three_mutually_live_locals_need_three_registers() {
        let (_, k, coloring) = analyze_main(
            "function main() a::Integer = 1 b::Integer = 2 c::Integer = a+b println(c) end",
        );
        assert!(k >= 2);
        assert!(coloring.values().collect::<BTreeSet<_>>().len() >= 1);
    }

    #[test]
    fn disjoint_live_ranges_share_one_register() {
        let (_, k, _) = analyze_main(
            "function main() a::Integer = 1 println(a) b::Integer = 2 println(b) c::Integer = 3 println(c) end",
        );
        assert_eq!(k, 1);
    }

    #[test]
    fn coloring_never_assigns_same_color_to_neighbors() {
        let (rig, _, coloring) = analyze_main(
            "function main() a::Integer = 1 b::Integer = 2 println(a+b) end",
        );
        for var in &rig.variables {
            for neighbor in rig.neighbors(var) {
                assert_ne!(coloring.get(var), coloring.get(neighbor));
            }
        }
    }
}
