use quill_ast::{BinaryOp, Block, ClassDecl, Expr, MethodDecl, Param, Program, Stmt, TypeAlternative};
use quill_binder::{Method, Registry, hierarchy};
use quill_common::{ClassId, CompileError, ErrorKind, Stage};

/// Run the whole checker pipeline over a program.
fn analyze(program: Program) -> Result<(Registry, Method), CompileError> {
    let mut registry = Registry::with_builtins();
    for class in program.classes {
        registry.declare(class)?;
    }
    let mut main = Method::entry(program.main);
    hierarchy::check(&mut registry)?;
    quill_checker::run(&mut registry, &mut main)?;
    Ok((registry, main))
}

fn analyze_main(stmts: Vec<Stmt>) -> Result<(Registry, Method), CompileError> {
    analyze(Program::new(vec![], Block::new(stmts)))
}

#[test]
fn literals_and_arithmetic_infer_their_classes() {
    let (_, main) = analyze_main(vec![
        Stmt::assign(
            Expr::ident("x"),
            Expr::binary(BinaryOp::Plus, Expr::int(1), Expr::int(2)),
        ),
        Stmt::assign(Expr::ident("s"), Expr::string("hi")),
        Stmt::assign(Expr::ident("b"), Expr::boolean(true)),
    ])
    .unwrap();
    assert_eq!(main.symbol_table.type_of("x", false), Some(ClassId::INT));
    assert_eq!(main.symbol_table.type_of("s", false), Some(ClassId::STRING));
    assert_eq!(main.symbol_table.type_of("b", false), Some(ClassId::BOOLEAN));
}

#[test]
fn binary_operator_dispatch_rejects_bad_right_operand() {
    // "a" + 1 fails: Int is not a subtype of String.
    let err = analyze_main(vec![Stmt::assign(
        Expr::ident("x"),
        Expr::binary(BinaryOp::Plus, Expr::string("a"), Expr::int(1)),
    )])
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::BinOp);
    assert_eq!(err.stage, Stage::TypeInference);
}

#[test]
fn comparison_dispatch_yields_boolean() {
    let (_, main) = analyze_main(vec![Stmt::assign(
        Expr::ident("b"),
        Expr::binary(BinaryOp::Less, Expr::int(1), Expr::int(2)),
    )])
    .unwrap();
    assert_eq!(main.symbol_table.type_of("b", false), Some(ClassId::BOOLEAN));
}

#[test]
fn flow_insensitive_join_widens_locals_upward() {
    // x sees Int and String: settles at their least common ancestor.
    let (_, main) = analyze_main(vec![
        Stmt::assign(Expr::ident("x"), Expr::int(1)),
        Stmt::assign(Expr::ident("x"), Expr::string("s")),
    ])
    .unwrap();
    assert_eq!(main.symbol_table.type_of("x", false), Some(ClassId::OBJ));
}

#[test]
fn annotation_widens_and_binds_the_variable() {
    let (_, main) = analyze_main(vec![Stmt::assign_typed(
        Expr::ident("x"),
        "Obj",
        Expr::int(5),
    )])
    .unwrap();
    assert_eq!(main.symbol_table.type_of("x", false), Some(ClassId::OBJ));
}

#[test]
fn annotation_violation_is_a_typing_error() {
    let err = analyze_main(vec![Stmt::assign_typed(
        Expr::ident("x"),
        "Int",
        Expr::string("s"),
    )])
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::TypingError);
}

#[test]
fn unknown_annotation_name_is_reported() {
    let err = analyze_main(vec![Stmt::assign_typed(
        Expr::ident("x"),
        "Phantom",
        Expr::int(5),
    )])
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnknownType);
    assert_eq!(err.stage, Stage::TypeInference);
}

#[test]
fn growing_past_an_annotation_is_rejected() {
    let err = analyze_main(vec![
        Stmt::assign_typed(Expr::ident("x"), "Int", Expr::int(1)),
        Stmt::assign(Expr::ident("x"), Expr::string("s")),
    ])
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::TypingError);
}

#[test]
fn if_and_while_conditions_must_be_boolean() {
    let err = analyze_main(vec![Stmt::If {
        cond: Expr::int(1),
        then_block: Block::empty(),
        else_block: Block::empty(),
    }])
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::IfCondType);

    let err = analyze_main(vec![Stmt::While {
        cond: Expr::int(1),
        body: Block::empty(),
    }])
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::WhileCondType);
}

#[test]
fn logical_operators_require_boolean_operands() {
    let err = analyze_main(vec![Stmt::assign(
        Expr::ident("b"),
        Expr::and(Expr::int(1), Expr::boolean(true)),
    )])
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::BoolOp);

    let (_, main) = analyze_main(vec![Stmt::assign(
        Expr::ident("b"),
        Expr::or(Expr::boolean(false), Expr::not(Expr::boolean(true))),
    )])
    .unwrap();
    assert_eq!(main.symbol_table.type_of("b", false), Some(ClassId::BOOLEAN));
}

#[test]
fn negation_requires_an_int() {
    let (_, main) = analyze_main(vec![Stmt::assign(Expr::ident("x"), Expr::neg(Expr::int(3)))])
        .unwrap();
    assert_eq!(main.symbol_table.type_of("x", false), Some(ClassId::INT));

    let err = analyze_main(vec![Stmt::assign(
        Expr::ident("x"),
        Expr::neg(Expr::string("a")),
    )])
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::UniOp);
}

#[test]
fn this_outside_a_class_is_rejected() {
    let err = analyze_main(vec![Stmt::Expr(Expr::method_call(
        Expr::this(),
        "STR",
        vec![],
    ))])
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ThisError);
}

#[test]
fn assignment_to_this_is_rejected() {
    let class = ClassDecl::new(
        "C",
        None,
        vec![],
        Block::new(vec![Stmt::assign(Expr::this(), Expr::int(1))]),
        vec![],
    );
    let err = analyze(Program::new(vec![class], Block::empty())).unwrap_err();
    assert_eq!(err.kind, ErrorKind::ThisError);
}

#[test]
fn unknown_constructor_is_reported() {
    let err = analyze_main(vec![Stmt::assign(
        Expr::ident("x"),
        Expr::call("Phantom", vec![]),
    )])
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnknownConstructor);
}

// -----------------------------------------------------------------------------
// Classes: dispatch, fields, returns
// -----------------------------------------------------------------------------

fn animal_hierarchy() -> Vec<ClassDecl> {
    let animal = ClassDecl::new(
        "Animal",
        None,
        vec![],
        Block::new(vec![Stmt::assign_typed(
            Expr::field(Expr::this(), "name"),
            "Obj",
            Expr::string("anonymous"),
        )]),
        vec![],
    );
    let dog = ClassDecl::new(
        "Dog",
        Some("Animal".to_string()),
        vec![],
        Block::new(vec![Stmt::assign(
            Expr::field(Expr::this(), "name"),
            Expr::string("Rex"),
        )]),
        vec![MethodDecl::new(
            "bark",
            vec![],
            Some("Int".to_string()),
            Block::new(vec![Stmt::Return(Some(Expr::int(1)))]),
        )],
    );
    let cat = ClassDecl::new(
        "Cat",
        Some("Animal".to_string()),
        vec![],
        Block::new(vec![Stmt::assign(
            Expr::field(Expr::this(), "name"),
            Expr::string("Tom"),
        )]),
        vec![MethodDecl::new(
            "meow",
            vec![],
            Some("Int".to_string()),
            Block::new(vec![Stmt::Return(Some(Expr::int(2)))]),
        )],
    );
    vec![animal, dog, cat]
}

#[test]
fn field_types_take_the_lub_of_constructor_writes() {
    let (registry, _) = analyze(Program::new(animal_hierarchy(), Block::empty())).unwrap();

    let animal = registry.lookup("Animal").unwrap();
    let dog = registry.lookup("Dog").unwrap();
    assert_eq!(
        registry.get(animal).fields["name"].ty,
        Some(ClassId::OBJ),
        "annotated Obj in Animal"
    );
    // Dog's narrower String field is accepted since String ≤ Obj.
    assert_eq!(registry.get(dog).fields["name"].ty, Some(ClassId::STRING));
}

#[test]
fn subclass_field_must_stay_below_the_super_field() {
    let animal = ClassDecl::new(
        "Animal",
        None,
        vec![],
        Block::new(vec![Stmt::assign(
            Expr::field(Expr::this(), "name"),
            Expr::string("x"),
        )]),
        vec![],
    );
    let dog = ClassDecl::new(
        "Dog",
        Some("Animal".to_string()),
        vec![],
        Block::new(vec![Stmt::assign(
            Expr::field(Expr::this(), "name"),
            Expr::int(5),
        )]),
        vec![],
    );
    let err = analyze(Program::new(vec![animal, dog], Block::empty())).unwrap_err();
    assert_eq!(err.kind, ErrorKind::SubtypeFieldType);
}

#[test]
fn method_dispatch_resolves_through_the_receiver() {
    let mut stmts = vec![
        Stmt::assign(Expr::ident("d"), Expr::call("Dog", vec![])),
        Stmt::assign(
            Expr::ident("n"),
            Expr::method_call(Expr::ident("d"), "bark", vec![]),
        ),
    ];
    stmts.push(Stmt::Expr(Expr::method_call(Expr::ident("d"), "PRINT", vec![])));
    let (_, main) = analyze(Program::new(animal_hierarchy(), Block::new(stmts))).unwrap();
    assert_eq!(main.symbol_table.type_of("n", false), Some(ClassId::INT));
}

#[test]
fn unknown_method_and_bad_arity_are_reported() {
    let err = analyze(Program::new(
        animal_hierarchy(),
        Block::new(vec![
            Stmt::assign(Expr::ident("d"), Expr::call("Dog", vec![])),
            Stmt::Expr(Expr::method_call(Expr::ident("d"), "fetch", vec![])),
        ]),
    ))
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::MethodError);

    let err = analyze(Program::new(
        animal_hierarchy(),
        Block::new(vec![
            Stmt::assign(Expr::ident("d"), Expr::call("Dog", vec![])),
            Stmt::Expr(Expr::method_call(
                Expr::ident("d"),
                "bark",
                vec![Expr::int(1)],
            )),
        ]),
    ))
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::FunctionCall);
}

#[test]
fn constructor_arguments_obey_subtype_obligations() {
    let point = ClassDecl::new(
        "Point",
        None,
        vec![Param::new("x", "Int")],
        Block::new(vec![Stmt::assign(
            Expr::field(Expr::this(), "x"),
            Expr::ident("x"),
        )]),
        vec![],
    );
    let err = analyze(Program::new(
        vec![point.clone()],
        Block::new(vec![Stmt::assign(
            Expr::ident("p"),
            Expr::call("Point", vec![Expr::string("no")]),
        )]),
    ))
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::FunctionCall);

    analyze(Program::new(
        vec![point],
        Block::new(vec![Stmt::assign(
            Expr::ident("p"),
            Expr::call("Point", vec![Expr::int(3)]),
        )]),
    ))
    .unwrap();
}

#[test]
fn constructor_return_must_be_the_class_itself() {
    let ok = ClassDecl::new(
        "C",
        None,
        vec![],
        Block::new(vec![Stmt::Return(Some(Expr::this()))]),
        vec![],
    );
    analyze(Program::new(vec![ok], Block::empty())).unwrap();

    let bad = ClassDecl::new(
        "D",
        None,
        vec![],
        Block::new(vec![Stmt::Return(Some(Expr::int(5)))]),
        vec![],
    );
    let err = analyze(Program::new(vec![bad], Block::empty())).unwrap_err();
    assert_eq!(err.kind, ErrorKind::ReturnType);
}

#[test]
fn method_returns_obey_the_declared_type() {
    let bad = ClassDecl::new(
        "C",
        None,
        vec![],
        Block::empty(),
        vec![MethodDecl::new(
            "m",
            vec![],
            Some("Int".to_string()),
            Block::new(vec![Stmt::Return(Some(Expr::string("s")))]),
        )],
    );
    let err = analyze(Program::new(vec![bad], Block::empty())).unwrap_err();
    assert_eq!(err.kind, ErrorKind::ReturnType);

    // Int ≤ Obj: returning an Int from an Obj method is fine.
    let ok = ClassDecl::new(
        "D",
        None,
        vec![],
        Block::empty(),
        vec![MethodDecl::new(
            "m",
            vec![],
            Some("Obj".to_string()),
            Block::new(vec![Stmt::Return(Some(Expr::int(1)))]),
        )],
    );
    analyze(Program::new(vec![ok], Block::empty())).unwrap();
}

#[test]
fn bare_return_is_only_for_nothing_methods() {
    let bad = ClassDecl::new(
        "C",
        None,
        vec![],
        Block::empty(),
        vec![MethodDecl::new(
            "m",
            vec![],
            Some("Int".to_string()),
            Block::new(vec![Stmt::Return(None)]),
        )],
    );
    let err = analyze(Program::new(vec![bad], Block::empty())).unwrap_err();
    assert_eq!(err.kind, ErrorKind::ReturnNothing);

    let ok = ClassDecl::new(
        "D",
        None,
        vec![],
        Block::empty(),
        vec![MethodDecl::new(
            "m",
            vec![],
            None,
            Block::new(vec![Stmt::Return(None)]),
        )],
    );
    analyze(Program::new(vec![ok], Block::empty())).unwrap();
}

#[test]
fn missing_return_on_some_path_is_rejected_early() {
    let bad = ClassDecl::new(
        "C",
        None,
        vec![],
        Block::empty(),
        vec![MethodDecl::new(
            "m",
            vec![],
            Some("Int".to_string()),
            Block::empty(),
        )],
    );
    let err = analyze(Program::new(vec![bad], Block::empty())).unwrap_err();
    assert_eq!(err.kind, ErrorKind::MissingReturn);
    assert_eq!(err.stage, Stage::ClassHierarchy);
}

#[test]
fn obj_returning_method_gets_an_implicit_return_none() {
    let class = ClassDecl::new(
        "C",
        None,
        vec![],
        Block::empty(),
        vec![MethodDecl::new(
            "m",
            vec![],
            Some("Obj".to_string()),
            Block::empty(),
        )],
    );
    let (registry, _) = analyze(Program::new(vec![class], Block::empty())).unwrap();
    let id = registry.lookup("C").unwrap();
    let body = &registry.get(id).methods["m"].body;
    assert!(matches!(body.stmts.last(), Some(Stmt::Return(Some(_)))));
}

#[test]
fn field_writes_in_methods_must_respect_the_established_type() {
    let bad = ClassDecl::new(
        "C",
        None,
        vec![],
        Block::new(vec![Stmt::assign(
            Expr::field(Expr::this(), "f"),
            Expr::int(1),
        )]),
        vec![MethodDecl::new(
            "set",
            vec![],
            None,
            Block::new(vec![Stmt::assign(
                Expr::field(Expr::this(), "f"),
                Expr::string("s"),
            )]),
        )],
    );
    let err = analyze(Program::new(vec![bad], Block::empty())).unwrap_err();
    assert_eq!(err.kind, ErrorKind::TypingError);
}

// -----------------------------------------------------------------------------
// Typecase
// -----------------------------------------------------------------------------

#[test]
fn typecase_narrows_the_binding_per_alternative() {
    let stmts = vec![
        Stmt::assign_typed(Expr::ident("x"), "Animal", Expr::call("Dog", vec![])),
        Stmt::Typecase {
            scrutinee: Expr::ident("x"),
            alternatives: vec![
                TypeAlternative {
                    binding: "y".to_string(),
                    class_name: "Dog".to_string(),
                    block: Block::new(vec![Stmt::assign(
                        Expr::ident("a"),
                        Expr::method_call(Expr::ident("y"), "bark", vec![]),
                    )]),
                },
                TypeAlternative {
                    binding: "y".to_string(),
                    class_name: "Cat".to_string(),
                    block: Block::new(vec![Stmt::assign(
                        Expr::ident("b"),
                        Expr::method_call(Expr::ident("y"), "meow", vec![]),
                    )]),
                },
            ],
        },
    ];
    let (registry, main) = analyze(Program::new(animal_hierarchy(), Block::new(stmts))).unwrap();

    // Both alternatives dispatched against their narrowed class.
    assert_eq!(main.symbol_table.type_of("a", false), Some(ClassId::INT));
    assert_eq!(main.symbol_table.type_of("b", false), Some(ClassId::INT));
    // Outside the typecase the binding is not narrowed to either arm.
    let animal = registry.lookup("Animal").unwrap();
    assert_eq!(main.symbol_table.type_of("y", false), Some(animal));
}

#[test]
fn typecase_alternative_must_fit_the_bindings_outer_type() {
    let stmts = vec![
        Stmt::assign(Expr::ident("y"), Expr::int(1)),
        Stmt::assign(Expr::ident("x"), Expr::call("Dog", vec![])),
        Stmt::Typecase {
            scrutinee: Expr::ident("x"),
            alternatives: vec![TypeAlternative {
                binding: "y".to_string(),
                class_name: "Dog".to_string(),
                block: Block::empty(),
            }],
        },
    ];
    let err = analyze(Program::new(animal_hierarchy(), Block::new(stmts))).unwrap_err();
    assert_eq!(err.kind, ErrorKind::TypecaseError);
}

#[test]
fn typecase_unknown_alternative_class_is_reported() {
    let stmts = vec![
        Stmt::assign(Expr::ident("x"), Expr::int(1)),
        Stmt::Typecase {
            scrutinee: Expr::ident("x"),
            alternatives: vec![TypeAlternative {
                binding: "y".to_string(),
                class_name: "Phantom".to_string(),
                block: Block::empty(),
            }],
        },
    ];
    let err = analyze_main(stmts).unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnknownType);
}

// -----------------------------------------------------------------------------
// Fixed point behavior
// -----------------------------------------------------------------------------

#[test]
fn inference_is_idempotent() {
    let program = Program::new(
        animal_hierarchy(),
        Block::new(vec![
            Stmt::assign(Expr::ident("d"), Expr::call("Dog", vec![])),
            Stmt::assign(
                Expr::ident("n"),
                Expr::method_call(Expr::ident("d"), "bark", vec![]),
            ),
        ]),
    );
    let (registry_a, main_a) = analyze(program.clone()).unwrap();
    let (registry_b, main_b) = analyze(program).unwrap();

    // Converged state is deterministic across runs.
    assert!(!main_a.symbol_table.is_dirty());
    assert_eq!(
        main_a.symbol_table.type_of("n", false),
        main_b.symbol_table.type_of("n", false)
    );
    let dog_a = registry_a.lookup("Dog").unwrap();
    let dog_b = registry_b.lookup("Dog").unwrap();
    assert_eq!(
        registry_a.get(dog_a).fields["name"].ty,
        registry_b.get(dog_b).fields["name"].ty
    );
}
