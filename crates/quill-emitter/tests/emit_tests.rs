use quill_ast::{BinaryOp, Block, ClassDecl, Expr, MethodDecl, Param, Program, Stmt, TypeAlternative};
use quill_binder::{Method, Registry, hierarchy};
use quill_emitter::{EmitOptions, emit_program};

/// Run the full front half of the pipeline, then emit.
fn emit(program: Program) -> String {
    let mut registry = Registry::with_builtins();
    for class in program.classes {
        registry.declare(class).expect("declaration accepted");
    }
    let mut main = Method::entry(program.main);
    hierarchy::check(&mut registry).expect("hierarchy valid");
    quill_checker::run(&mut registry, &mut main).expect("checks pass");
    emit_program(&registry, &main, EmitOptions::default())
}

fn point_class() -> ClassDecl {
    ClassDecl::new(
        "Point",
        None,
        vec![Param::new("x", "Int"), Param::new("y", "Int")],
        Block::new(vec![
            Stmt::assign(Expr::field(Expr::this(), "x"), Expr::ident("x")),
            Stmt::assign(Expr::field(Expr::this(), "y"), Expr::ident("y")),
        ]),
        vec![MethodDecl::new(
            "size",
            vec![],
            Some("Int".to_string()),
            Block::new(vec![Stmt::Return(Some(Expr::field(Expr::this(), "x")))]),
        )],
    )
}

fn assert_in_order(haystack: &str, needles: &[&str]) {
    let mut from = 0;
    for needle in needles {
        match haystack[from..].find(needle) {
            Some(at) => from += at + needle.len(),
            None => panic!("expected {needle:?} after byte {from} in output:\n{haystack}"),
        }
    }
}

#[test]
fn output_opens_with_the_include_block() {
    let code = emit(Program::new(vec![], Block::empty()));
    assert_in_order(
        &code,
        &[
            "#include <stdlib.h>",
            "#include <stdio.h>",
            "#include <stdbool.h>",
            "#include \"builtins.h\"",
        ],
    );
}

#[test]
fn object_struct_has_clazz_then_fields_sorted_by_name() {
    let code = emit(Program::new(vec![point_class()], Block::empty()));
    assert_in_order(
        &code,
        &[
            "struct class_Point_struct;",
            "typedef struct class_Point_struct* class_Point;",
            "typedef struct obj_Point_struct {",
            "\tclass_Point clazz;",
            "\tobj_Int x;",
            "\tobj_Int y;",
            "} * obj_Point;",
        ],
    );
}

#[test]
fn class_struct_has_super_constructor_then_methods() {
    let code = emit(Program::new(vec![point_class()], Block::empty()));
    assert_in_order(
        &code,
        &[
            "struct class_Point_struct {",
            "\tclass_Obj super_;",
            "\tobj_Point (*constructor)(obj_Int, obj_Int);",
            // Obj's slots come first, then Point's own methods.
            "\tobj_Boolean (*EQUALS)(obj_Obj, obj_Obj);",
            "\tobj_Obj (*PRINT)(obj_Obj);",
            "\tobj_String (*STR)(obj_Obj);",
            "\tobj_Int (*size)(obj_Point);",
            "};",
        ],
    );
}

#[test]
fn dispatch_record_points_at_nearest_implementations() {
    let code = emit(Program::new(vec![point_class()], Block::empty()));
    assert_in_order(
        &code,
        &[
            "struct class_Point_struct the_class_Point_struct = {",
            "\t(class_Obj)&the_class_Obj_struct,",
            "\tnew_Point,",
            "\tObj_method_EQUALS,",
            "\tObj_method_PRINT,",
            "\tObj_method_STR,",
            "\tPoint_method_size",
            "};",
            "class_Point the_class_Point = &the_class_Point_struct;",
        ],
    );
}

#[test]
fn constructor_allocates_stores_clazz_and_returns_this() {
    let code = emit(Program::new(vec![point_class()], Block::empty()));
    assert_in_order(
        &code,
        &[
            "obj_Point new_Point(obj_Int x, obj_Int y) {",
            "\tobj_Point this = (obj_Point)malloc(sizeof(struct obj_Point_struct));",
            "\tthis->clazz = the_class_Point;",
            "\treturn this;",
            "}",
        ],
    );
}

#[test]
fn method_takes_this_as_first_parameter() {
    let code = emit(Program::new(vec![point_class()], Block::empty()));
    assert!(code.contains("obj_Int Point_method_size(obj_Point this) {"));
    assert!(code.contains("obj_Int Point_method_size(obj_Point this);"));
}

#[test]
fn overrides_replace_their_slot_in_place() {
    let animal = ClassDecl::new(
        "Animal",
        None,
        vec![],
        Block::empty(),
        vec![MethodDecl::new(
            "speak",
            vec![],
            Some("String".to_string()),
            Block::new(vec![Stmt::Return(Some(Expr::string("...")))]),
        )],
    );
    let dog = ClassDecl::new(
        "Dog",
        Some("Animal".to_string()),
        vec![],
        Block::empty(),
        vec![
            MethodDecl::new(
                "bark",
                vec![],
                Some("String".to_string()),
                Block::new(vec![Stmt::Return(Some(Expr::string("woof")))]),
            ),
            MethodDecl::new(
                "speak",
                vec![],
                Some("String".to_string()),
                Block::new(vec![Stmt::Return(Some(Expr::string("woof")))]),
            ),
        ],
    );
    let code = emit(Program::new(vec![animal, dog], Block::empty()));

    // Supers are emitted first.
    let animal_at = code.find("/*======================= Animal").unwrap();
    let dog_at = code.find("/*======================= Dog").unwrap();
    assert!(animal_at < dog_at);

    // The speak slot keeps its inherited position (before the appended
    // bark slot comes after it alphabetically appended at the end), and
    // Dog's record points at Dog's implementation.
    assert_in_order(
        &code,
        &[
            "struct class_Dog_struct {",
            "\tobj_String (*speak)(obj_Dog);",
            "\tobj_String (*bark)(obj_Dog);",
            "};",
            "struct class_Dog_struct the_class_Dog_struct = {",
            "\t(class_Obj)&the_class_Animal_struct,",
            "\tnew_Dog,",
            "\tDog_method_speak,",
            "\tDog_method_bark",
            "};",
        ],
    );
    // Animal's record keeps Animal's implementation.
    assert_in_order(
        &code,
        &[
            "struct class_Animal_struct the_class_Animal_struct = {",
            "\tAnimal_method_speak",
        ],
    );
}

#[test]
fn binary_operators_dispatch_through_the_left_operand() {
    let code = emit(Program::new(
        vec![],
        Block::new(vec![Stmt::assign(
            Expr::ident("x"),
            Expr::binary(BinaryOp::Plus, Expr::int(1), Expr::int(2)),
        )]),
    ));
    assert_in_order(
        &code,
        &[
            "obj_Int __temp_var_0000 = int_literal(1);",
            "obj_Int __temp_var_0001 = int_literal(2);",
            "->clazz->PLUS((obj_Int)__temp_var_0000, (obj_Int)__temp_var_0001)",
            "x = (obj_Int)(",
        ],
    );
}

#[test]
fn if_lowers_to_three_labels() {
    let code = emit(Program::new(
        vec![],
        Block::new(vec![Stmt::If {
            cond: Expr::boolean(true),
            then_block: Block::new(vec![Stmt::assign(Expr::ident("x"), Expr::int(1))]),
            else_block: Block::new(vec![Stmt::assign(Expr::ident("x"), Expr::int(2))]),
        }]),
    ));
    assert_in_order(
        &code,
        &[
            "goto if0000;",
            "/* True Part If */",
            "if0000: ; /* Null statement */",
            "goto end_if0002;",
            "/* False Part If */",
            "else0001: ; /* Null statement */",
            "/* End If */",
            "end_if0002: ; /* Null statement */",
        ],
    );
}

#[test]
fn while_tests_the_condition_at_the_bottom() {
    let code = emit(Program::new(
        vec![],
        Block::new(vec![
            Stmt::assign(Expr::ident("going"), Expr::boolean(true)),
            Stmt::While {
                cond: Expr::ident("going"),
                body: Block::new(vec![Stmt::assign(Expr::ident("going"), Expr::boolean(false))]),
            },
        ]),
    ));
    assert_in_order(
        &code,
        &[
            "/* WHILE Loop Start */",
            "goto test_cond0000;",
            "loop_again0001: ; /* Null statement */",
            "test_cond0000: ; /* Null statement */",
            "if(lit_true == going) { goto loop_again0001; }",
            "goto end_while0002;",
            "end_while0002: ; /* Null statement */",
            "/* END WHILE Loop */",
        ],
    );
}

#[test]
fn short_circuit_and_lowers_to_branches() {
    let code = emit(Program::new(
        vec![],
        Block::new(vec![Stmt::assign(
            Expr::ident("b"),
            Expr::and(Expr::boolean(true), Expr::boolean(false)),
        )]),
    ));
    assert_in_order(
        &code,
        &[
            "obj_Boolean __temp_var_0000 = lit_false;",
            "/* and Left Condition */",
            "and_HALFWAY0000: ; /* Null statement */",
            "/* and Right Condition */",
            "/* Boolean Get True */",
            "and_TRUE0001: ; /* Null statement */",
            "__temp_var_0000 = lit_true;",
            "and_END0002: ; /* Null statement */",
        ],
    );
}

#[test]
fn negation_lowers_as_zero_minus_operand() {
    let code = emit(Program::new(
        vec![],
        Block::new(vec![Stmt::assign(Expr::ident("x"), Expr::neg(Expr::int(7)))]),
    ));
    assert_in_order(
        &code,
        &[
            "int_literal(0);",
            "int_literal(7);",
            "->clazz->MINUS((obj_Int)",
        ],
    );
}

#[test]
fn typecase_tests_subtype_against_dispatch_records() {
    let animal = ClassDecl::new("Animal", None, vec![], Block::empty(), vec![]);
    let dog = ClassDecl::new("Dog", Some("Animal".to_string()), vec![], Block::empty(), vec![]);
    let code = emit(Program::new(
        vec![animal, dog],
        Block::new(vec![
            Stmt::assign_typed(Expr::ident("x"), "Animal", Expr::call("Dog", vec![])),
            Stmt::Typecase {
                scrutinee: Expr::ident("x"),
                alternatives: vec![TypeAlternative {
                    binding: "d".to_string(),
                    class_name: "Dog".to_string(),
                    block: Block::new(vec![Stmt::Expr(Expr::method_call(
                        Expr::ident("d"),
                        "PRINT",
                        vec![],
                    ))]),
                }],
            },
        ]),
    ));
    assert_in_order(
        &code,
        &[
            "/* Typecase START */",
            "typecase_Dog_",
            "if(!is_subtype((class_Obj)",
            "->clazz, (class_Obj)(&the_class_Dog_struct))) { goto end_typecase",
            "d = (obj_Dog)(",
            "/* Typecase END */",
        ],
    );
}

#[test]
fn field_reads_and_writes_go_through_temporaries() {
    let counter = ClassDecl::new(
        "Counter",
        None,
        vec![],
        Block::new(vec![Stmt::assign(
            Expr::field(Expr::this(), "n"),
            Expr::int(0),
        )]),
        vec![MethodDecl::new(
            "bump",
            vec![],
            None,
            Block::new(vec![Stmt::assign(
                Expr::field(Expr::this(), "n"),
                Expr::binary(
                    BinaryOp::Plus,
                    Expr::field(Expr::this(), "n"),
                    Expr::int(1),
                ),
            )]),
        )],
    );
    let code = emit(Program::new(vec![counter], Block::empty()));
    // Read into a temp, write through an address temp.
    assert!(code.contains("= this->n;"));
    assert!(code.contains("* ") && code.contains("= &(this->n);"));
}

#[test]
fn entry_wrappers_close_the_file() {
    let code = emit(Program::new(
        vec![],
        Block::new(vec![Stmt::assign(Expr::ident("x"), Expr::int(1))]),
    ));
    assert_in_order(
        &code,
        &[
            "obj_Nothing _main() {",
            "\tobj_Int x;",
            "\t/* main Method Body */",
            "\treturn none;",
            "}",
            "int main() {",
            "\t_main();",
            "}",
        ],
    );
}

#[test]
fn counters_reset_between_compilations() {
    let program = Program::new(
        vec![],
        Block::new(vec![Stmt::assign(
            Expr::ident("x"),
            Expr::binary(BinaryOp::Plus, Expr::int(1), Expr::int(2)),
        )]),
    );
    let first = emit(program.clone());
    let second = emit(program);
    assert_eq!(first, second);
}

#[test]
fn constructor_locals_come_from_the_symbol_table() {
    let class = ClassDecl::new(
        "C",
        None,
        vec![Param::new("seed", "Int")],
        Block::new(vec![
            Stmt::assign(Expr::ident("tmp"), Expr::ident("seed")),
            Stmt::assign(Expr::field(Expr::this(), "value"), Expr::ident("tmp")),
        ]),
        vec![],
    );
    let code = emit(Program::new(vec![class], Block::empty()));
    // tmp is a local; seed is a parameter and value a field, neither
    // re-declared in the body.
    assert_in_order(&code, &["new_C(obj_Int seed) {", "\tobj_Int tmp;"]);
    assert!(!code.contains("\tobj_Int seed;"));
    assert!(!code.contains("\tobj_Int value;"));
}
