//! Local-variable slot allocation.

use juliac_parser::ast::Type;

use crate::symtab::FunctionSymbol;

use super::cost_of;

/// Maps local names to their JVM slot number, assigned by iterating
/// locals in insertion order with Float64 consuming two consecutive
/// slots and everything else consuming one.
#[derive(Debug)]
pub(super) struct SlotMap {
    slots: Vec<(String, u16)>,
    total: u16,
}

impl SlotMap {
    pub(super) fn new(function: &FunctionSymbol) -> Self {
        let mut slots = Vec::new();
        let mut next: u16 = 0;
        for (name, ty) in function.locals.iter() {
            slots.push((name.clone(), next));
            next += cost_of(*ty) as u16;
        }
        Self { slots, total: next }
    }

    pub(super) fn get(&self, name: &str) -> u16 {
        self.slots
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, slot)| *slot)
            .unwrap_or_else(|| panic!("codegen requested slot for unknown local '{name}'"))
    }

    pub(super) fn total_slots(&self) -> u16 {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_locals_consume_two_slots() {
        let mut sym = FunctionSymbol::new("f".to_string(), None);
        sym.add_local("a".to_string(), Type::Float64);
        sym.add_local("b".to_string(), Type::Integer);
        let slots = SlotMap::new(&sym);
        assert_eq!(slots.get("a"), 0);
        assert_eq!(slots.get("b"), 2);
        assert_eq!(slots.total_slots(), 3);
    }

    #[test]
    fn main_args_slot_is_leading() {
        let mut sym = FunctionSymbol::new("main".to_string(), None);
        sym.reserve_main_args_slot();
        sym.add_local("y".to_string(), Type::Float64);
        let slots = SlotMap::new(&sym);
        assert_eq!(slots.get(crate::symtab::MAIN_ARGS_SLOT), 0);
        assert_eq!(slots.get("y"), 1);
    }
}
