use juliac_parser::ast::{Instruction, Type};
use juliac_parser::parse;

#[test]
fn parses_minimal_main() {
    let program = parse("function main() end").expect("parses");
    assert!(program.functions.is_empty());
    assert!(program.main.body.instructions.is_empty());
}

#[test]
fn parses_function_with_params_and_return_type() {
    let src = "function f(x::Integer)::Integer return x+1 end\nfunction main() println(f(41)) end";
    let program = parse(src).expect("parses");
    assert_eq!(program.functions.len(), 1);
    let f = &program.functions[0];
    assert_eq!(f.name, "f");
    assert_eq!(f.params.len(), 1);
    assert_eq!(f.params[0].ty, Type::Integer);
    assert_eq!(f.return_type, Some(Type::Integer));
    assert_eq!(program.main.body.instructions.len(), 1);
}

#[test]
fn parses_prologue_declaration() {
    let src = "function main() y::Float64 = 1 println(y) end";
    let program = parse(src).expect("parses");
    assert_eq!(program.main.body.declarations.len(), 1);
    assert_eq!(program.main.body.declarations[0].name, "y");
    assert_eq!(program.main.body.declarations[0].ty, Type::Float64);
}

#[test]
fn parses_if_while_and_assignment() {
    let src = r#"
        function main()
            x::Integer = 0
            while x < 3
                x = x + 1
            end
            if x == 3
                println("done")
            else
                println("nope")
            end
        end
    "#;
    let program = parse(src).expect("parses");
    assert_eq!(program.main.body.instructions.len(), 2);
    assert!(matches!(
        program.main.body.instructions[0],
        Instruction::While { .. }
    ));
    assert!(matches!(
        program.main.body.instructions[1],
        Instruction::If { .. }
    ));
}

#[test]
fn rejects_missing_main() {
    let result = parse("function f() end");
    assert!(result.is_err());
}

#[test]
fn rejects_unknown_type_name() {
    let result = parse("function main() x::Whatever = 1 end");
    assert!(result.is_err());
}
