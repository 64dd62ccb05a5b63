//! Refactoring overrides, both class-local and project-wide.

mod common;

use astdiff::arbor::{NodeId, SyntaxTree, kinds};
use astdiff::refactoring::{
    AttributeMove, AttributeRename, ConditionalSplit, FragmentMerge, LoopRewrite, OperationBody,
    OperationMove, VariableMerge, VariableSplit,
};
use astdiff::{
    Attribute, BodyMapper, ClassPairDiff, LambdaExpression, ModelDiff, ProjectDiffer, Refactoring,
    ReconcileWarning, TypeRef, VariableDeclaration, VersionTrees,
};
use common::*;
use facet_testhelpers::test;

const FILE: &str = "Worker.java";

/// One class pair in one file, carrying the given class-local refactorings.
fn class_pair_model(
    before: &str,
    after: &str,
    refactorings: impl FnOnce(&SyntaxTree, &SyntaxTree) -> Vec<Refactoring>,
) -> ModelDiff {
    let (a, b) = (parse(before), parse(after));
    let pair = ClassPairDiff {
        original: class(FILE, &a, 0, "Worker"),
        next: class(FILE, &b, 0, "Worker"),
        refactorings: refactorings(&a, &b),
        ..Default::default()
    };
    ModelDiff {
        before: VersionTrees::from_iter([(FILE, a)]),
        after: VersionTrees::from_iter([(FILE, b)]),
        common_class_diffs: vec![pair],
        ..Default::default()
    }
}

fn method(body: &str) -> String {
    format!("(CompilationUnit (TypeDeclaration SimpleName:Worker (MethodDeclaration SimpleName:run (Block {body}))))")
}

const ADDER: &str = "(MethodDeclaration PrimitiveType:int SimpleName:total \
    (Block (ReturnStatement (InfixExpression SimpleName:a INFIX_EXPRESSION_OPERATOR:+ SimpleName:b))))";

#[test]
fn test_moved_method_is_mapped_across_files() {
    let x_before = parse(&format!("(CompilationUnit (TypeDeclaration SimpleName:A {ADDER}))"));
    let x_after = parse("(CompilationUnit (TypeDeclaration SimpleName:A))");
    let y_before = parse("(CompilationUnit (TypeDeclaration SimpleName:B))");
    let y_after = parse(&format!("(CompilationUnit (TypeDeclaration SimpleName:B {ADDER}))"));

    let (from, to) = (first(&x_before, kinds::METHOD_DECLARATION), first(&y_after, kinds::METHOD_DECLARATION));
    let moved = OperationMove {
        original: operation("X.java", &x_before, from, "A"),
        moved: operation("Y.java", &y_after, to, "B"),
        body_mapper: BodyMapper {
            container1: container("X.java", &x_before, from, "A"),
            container2: container("Y.java", &y_after, to, "B"),
            mappings: vec![leaf_mapping(
                fragment("X.java", &x_before, first(&x_before, kinds::RETURN_STATEMENT)),
                fragment("Y.java", &y_after, first(&y_after, kinds::RETURN_STATEMENT)),
            )],
            ..Default::default()
        },
    };
    let class_pairs = vec![
        ClassPairDiff {
            original: class("X.java", &x_before, 0, "A"),
            next: class("X.java", &x_after, 0, "A"),
            ..Default::default()
        },
        ClassPairDiff {
            original: class("Y.java", &y_before, 0, "B"),
            next: class("Y.java", &y_after, 0, "B"),
            ..Default::default()
        },
    ];
    let model = ModelDiff {
        before: VersionTrees::from_iter([("X.java", x_before), ("Y.java", y_before)]),
        after: VersionTrees::from_iter([("X.java", x_after), ("Y.java", y_after)]),
        common_class_diffs: class_pairs,
        refactorings: vec![Refactoring::MoveOperation(moved)],
        ..Default::default()
    };

    let diffs_differ = ProjectDiffer::new(&model);
    let diffs = diffs_differ.diff();
    assert!(diffs.warnings().is_empty());
    assert_eq!(diffs.len(), 3);

    let across = diffs.get("X.java", "Y.java").unwrap();
    let (src, dst, store) = (across.src_tree, across.dst_tree, &across.mappings);
    let (src_return, dst_return) = (first(src, kinds::RETURN_STATEMENT), first(dst, kinds::RETURN_STATEMENT));
    assert!(store.contains(first(src, kinds::METHOD_DECLARATION), first(dst, kinds::METHOD_DECLARATION)));
    assert!(store.contains(src_return, dst_return));
    assert!(store.contains(find(src, kinds::SIMPLE_NAME, "a"), find(dst, kinds::SIMPLE_NAME, "a")));
    assert!(store.contains(find(src, kinds::SIMPLE_NAME, "total"), find(dst, kinds::SIMPLE_NAME, "total")));

    assert!(!diffs.get("X.java", "X.java").unwrap().mappings.contains_src(src_return));
    assert!(!diffs.get("Y.java", "Y.java").unwrap().mappings.contains_dst(dst_return));
}

#[test]
fn test_pulled_up_attribute_is_mapped_across_files() {
    let field = "(FieldDeclaration Modifier:protected PrimitiveType:int (VariableDeclarationFragment SimpleName:size))";
    let sub_before = parse(&format!("(CompilationUnit (TypeDeclaration SimpleName:Sub {field}))"));
    let base_after = parse(&format!("(CompilationUnit (TypeDeclaration SimpleName:Base {field}))"));
    let attribute = |file: &str, tree: &SyntaxTree, class_name: &str| Attribute {
        name: "size".into(),
        class_name: class_name.into(),
        location: at(file, tree, first(tree, kinds::VARIABLE_DECLARATION_FRAGMENT)),
        type_: TypeRef {
            name: "int".into(),
            location: at(file, tree, first(tree, kinds::PRIMITIVE_TYPE)),
        },
        ..Default::default()
    };
    let pulled = AttributeMove {
        original: attribute("Sub.java", &sub_before, "Sub"),
        moved: attribute("Base.java", &base_after, "Base"),
    };
    let model = ModelDiff {
        before: VersionTrees::from_iter([("Sub.java", sub_before)]),
        after: VersionTrees::from_iter([("Base.java", base_after)]),
        refactorings: vec![Refactoring::PullUpAttribute(pulled)],
        ..Default::default()
    };

    let diffs_differ = ProjectDiffer::new(&model);
    let diffs = diffs_differ.diff();
    let across = diffs.get("Sub.java", "Base.java").unwrap();
    let (src, dst) = (across.src_tree, across.dst_tree);
    let (src_field, dst_field) = (first(src, kinds::FIELD_DECLARATION), first(dst, kinds::FIELD_DECLARATION));
    assert!(across.mappings.contains(src_field, dst_field));
    assert!(across.mappings.contains(
        find(src, kinds::MODIFIER, "protected"),
        find(dst, kinds::MODIFIER, "protected")
    ));
    assert_eq!(across.mappings.len(), src.size(src_field));
}

#[test]
fn test_rename_attribute_maps_old_name_to_new() {
    let before = "(CompilationUnit (TypeDeclaration SimpleName:Worker \
        (FieldDeclaration Modifier:private PrimitiveType:int (VariableDeclarationFragment SimpleName:count NumberLiteral:0))))";
    let after = before.replace("SimpleName:count", "SimpleName:total");
    let model = class_pair_model(before, &after, |a, b| {
        let attribute = |t: &SyntaxTree, name: &str| Attribute {
            name: name.into(),
            class_name: "Worker".into(),
            location: at(FILE, t, first(t, kinds::VARIABLE_DECLARATION_FRAGMENT)),
            ..Default::default()
        };
        vec![Refactoring::RenameAttribute(AttributeRename {
            original: attribute(a, "count"),
            renamed: attribute(b, "total"),
        })]
    });
    let diffs_differ = ProjectDiffer::new(&model);
    let diffs = diffs_differ.diff();
    let diff = diffs.get(FILE, FILE).unwrap();
    let (src, dst) = (diff.src_tree, diff.dst_tree);
    assert!(diff.mappings.contains(find(src, kinds::SIMPLE_NAME, "count"), find(dst, kinds::SIMPLE_NAME, "total")));
    assert!(diff.mappings.contains(first(src, kinds::NUMBER_LITERAL), first(dst, kinds::NUMBER_LITERAL)));
}

#[test]
fn test_extracted_method_body_is_mapped() {
    let statement = "(ExpressionStatement (MethodInvocation SimpleName:flush SimpleName:out))";
    let before = method(statement);
    let after = format!(
        "(CompilationUnit (TypeDeclaration SimpleName:Worker \
         (MethodDeclaration SimpleName:run (Block (ExpressionStatement (MethodInvocation SimpleName:drain)))) \
         (MethodDeclaration SimpleName:drain (Block {statement}))))"
    );
    let model = class_pair_model(&before, &after, |a, b| {
        let (run, drain) = (nth(a, kinds::METHOD_DECLARATION, 0), nth(b, kinds::METHOD_DECLARATION, 1));
        let flush = |t: &SyntaxTree| {
            let name = find(t, kinds::SIMPLE_NAME, "flush");
            t.parent(name).and_then(|call| t.parent(call)).unwrap()
        };
        vec![Refactoring::ExtractOperation(OperationBody {
            body_mapper: BodyMapper {
                container1: container(FILE, a, run, "Worker"),
                container2: container(FILE, b, drain, "Worker"),
                mappings: vec![leaf_mapping(fragment(FILE, a, flush(a)), fragment(FILE, b, flush(b)))],
                ..Default::default()
            },
        })]
    });
    let diffs_differ = ProjectDiffer::new(&model);
    let diffs = diffs_differ.diff();
    let diff = diffs.get(FILE, FILE).unwrap();
    let (src, dst) = (diff.src_tree, diff.dst_tree);
    assert!(diff.mappings.contains(find(src, kinds::SIMPLE_NAME, "flush"), find(dst, kinds::SIMPLE_NAME, "flush")));
    assert!(diff.mappings.contains(find(src, kinds::SIMPLE_NAME, "out"), find(dst, kinds::SIMPLE_NAME, "out")));
}

const NESTED_IFS: &str = "(IfStatement SimpleName:ready (Block (IfStatement SimpleName:open (Block (ReturnStatement)))))";
const MERGED_IF: &str = "(IfStatement (InfixExpression SimpleName:ready INFIX_EXPRESSION_OPERATOR:&& SimpleName:open) \
    (Block (ReturnStatement)))";

#[test]
fn test_split_conditional_links_one_to_many() {
    let model = class_pair_model(&method(MERGED_IF), &method(NESTED_IFS), |a, b| {
        vec![Refactoring::SplitConditional(ConditionalSplit {
            original: fragment(FILE, a, first(a, kinds::IF_STATEMENT)),
            split: vec![
                fragment(FILE, b, nth(b, kinds::IF_STATEMENT, 0)),
                fragment(FILE, b, nth(b, kinds::IF_STATEMENT, 1)),
            ],
            ..Default::default()
        })]
    });
    let diffs_differ = ProjectDiffer::new(&model);
    let diffs = diffs_differ.diff();
    let diff = diffs.get(FILE, FILE).unwrap();
    let (src, dst, store) = (diff.src_tree, diff.dst_tree, &diff.mappings);

    let original = first(src, kinds::IF_STATEMENT);
    assert_eq!(store.dsts(original), &[nth(dst, kinds::IF_STATEMENT, 0), nth(dst, kinds::IF_STATEMENT, 1)]);
    assert!(store.contains(find(src, kinds::SIMPLE_NAME, "ready"), find(dst, kinds::SIMPLE_NAME, "ready")));
    assert!(store.contains(find(src, kinds::SIMPLE_NAME, "open"), find(dst, kinds::SIMPLE_NAME, "open")));
    assert!(!store.contains_src(first(src, kinds::INFIX_EXPRESSION)));
}

#[test]
fn test_merge_conditional_links_many_to_one() {
    let model = class_pair_model(&method(NESTED_IFS), &method(MERGED_IF), |a, b| {
        vec![Refactoring::MergeConditional(FragmentMerge {
            merged: vec![
                fragment(FILE, a, nth(a, kinds::IF_STATEMENT, 0)),
                fragment(FILE, a, nth(a, kinds::IF_STATEMENT, 1)),
            ],
            new: fragment(FILE, b, first(b, kinds::IF_STATEMENT)),
            ..Default::default()
        })]
    });
    let diffs_differ = ProjectDiffer::new(&model);
    let diffs = diffs_differ.diff();
    let diff = diffs.get(FILE, FILE).unwrap();
    let (src, dst, store) = (diff.src_tree, diff.dst_tree, &diff.mappings);

    let merged = first(dst, kinds::IF_STATEMENT);
    assert_eq!(store.srcs(merged), &[nth(src, kinds::IF_STATEMENT, 0), nth(src, kinds::IF_STATEMENT, 1)]);
    assert!(store.contains(find(src, kinds::SIMPLE_NAME, "ready"), find(dst, kinds::SIMPLE_NAME, "ready")));
    assert!(store.contains(find(src, kinds::SIMPLE_NAME, "open"), find(dst, kinds::SIMPLE_NAME, "open")));
}

#[test]
fn test_expression_mappings_resolve_after_overrides() {
    let assignment = "(ExpressionStatement (Assignment SimpleName:x ASSIGNMENT_OPERATOR:= SimpleName:y))";
    let before = method(&format!("{assignment} {NESTED_IFS}"));
    let after = method(&format!("{assignment} {MERGED_IF}"));
    let (a, b) = (parse(&before), parse(&after));
    let mut expression = leaf_mapping(
        fragment(FILE, &a, first(&a, kinds::ASSIGNMENT)),
        fragment(FILE, &b, first(&b, kinds::ASSIGNMENT)),
    );
    expression.fragment1.is_expression = true;
    let pair = ClassPairDiff {
        original: class(FILE, &a, 0, "Worker"),
        next: class(FILE, &b, 0, "Worker"),
        body_mappers: vec![BodyMapper {
            container1: container(FILE, &a, first(&a, kinds::METHOD_DECLARATION), "Worker"),
            container2: container(FILE, &b, first(&b, kinds::METHOD_DECLARATION), "Worker"),
            mappings: vec![expression],
            ..Default::default()
        }],
        refactorings: vec![Refactoring::MergeConditional(FragmentMerge {
            merged: vec![
                fragment(FILE, &a, nth(&a, kinds::IF_STATEMENT, 0)),
                fragment(FILE, &a, nth(&a, kinds::IF_STATEMENT, 1)),
            ],
            new: fragment(FILE, &b, first(&b, kinds::IF_STATEMENT)),
            ..Default::default()
        })],
        ..Default::default()
    };
    let model = ModelDiff {
        before: VersionTrees::from_iter([(FILE, a)]),
        after: VersionTrees::from_iter([(FILE, b)]),
        common_class_diffs: vec![pair],
        ..Default::default()
    };

    let diffs_differ = ProjectDiffer::new(&model);
    let diffs = diffs_differ.diff();
    let diff = diffs.get(FILE, FILE).unwrap();
    let (src, dst) = (diff.src_tree, diff.dst_tree);
    let order: Vec<_> = diff.mappings.pairs().collect();
    let index_of = |pair: (NodeId, NodeId)| order.iter().position(|&p| p == pair).unwrap();

    let assignment_pair = (first(src, kinds::ASSIGNMENT), first(dst, kinds::ASSIGNMENT));
    let x_pair = (find(src, kinds::SIMPLE_NAME, "x"), find(dst, kinds::SIMPLE_NAME, "x"));
    let override_pair = (nth(src, kinds::IF_STATEMENT, 1), first(dst, kinds::IF_STATEMENT));
    assert!(index_of(assignment_pair) < index_of(override_pair));
    assert!(index_of(override_pair) < index_of(x_pair));
}

const LOOP: &str = "(EnhancedForStatement (SingleVariableDeclaration (SimpleType SimpleName:Item) SimpleName:item) \
    SimpleName:items (Block (ExpressionStatement (MethodInvocation SimpleName:process SimpleName:item))))";
const PIPELINE: &str = "(ExpressionStatement (MethodInvocation SimpleName:items SimpleName:forEach \
    (LambdaExpression (VariableDeclarationFragment SimpleName:item) (MethodInvocation SimpleName:process SimpleName:item))))";

/// Loop fragment with its variable, and pipeline fragment with its lambda.
fn loop_fragments(
    loop_tree: &SyntaxTree,
    pipeline_tree: &SyntaxTree,
    parameter: &str,
) -> (astdiff::CodeFragment, astdiff::CodeFragment) {
    let mut for_fragment = fragment(FILE, loop_tree, first(loop_tree, kinds::ENHANCED_FOR_STATEMENT));
    for_fragment.variables = vec![variable(
        FILE,
        loop_tree,
        first(loop_tree, kinds::SINGLE_VARIABLE_DECLARATION),
        "item",
    )];
    let statement = first(pipeline_tree, kinds::METHOD_INVOCATION);
    let mut pipeline = fragment(FILE, pipeline_tree, pipeline_tree.parent(statement).unwrap());
    pipeline.lambdas = vec![LambdaExpression {
        location: at(FILE, pipeline_tree, first(pipeline_tree, kinds::LAMBDA_EXPRESSION)),
        parameters: vec![VariableDeclaration {
            name: parameter.into(),
            location: at(FILE, pipeline_tree, first(pipeline_tree, kinds::VARIABLE_DECLARATION_FRAGMENT)),
            type_: None,
        }],
    }];
    (for_fragment, pipeline)
}

#[test]
fn test_loop_replaced_with_pipeline() {
    let model = class_pair_model(&method(LOOP), &method(PIPELINE), |a, b| {
        let (for_fragment, pipeline) = loop_fragments(a, b, "item");
        vec![Refactoring::ReplaceLoopWithPipeline(LoopRewrite {
            fragments_before: vec![for_fragment],
            fragments_after: vec![pipeline],
            ..Default::default()
        })]
    });
    let diffs_differ = ProjectDiffer::new(&model);
    let diffs = diffs_differ.diff();
    assert!(diffs.warnings().is_empty());
    let diff = diffs.get(FILE, FILE).unwrap();
    let (src, dst, store) = (diff.src_tree, diff.dst_tree, &diff.mappings);

    let pipeline = dst.parent(first(dst, kinds::METHOD_INVOCATION)).unwrap();
    assert!(store.contains(first(src, kinds::ENHANCED_FOR_STATEMENT), pipeline));
    assert!(store.contains(
        first(src, kinds::SINGLE_VARIABLE_DECLARATION),
        first(dst, kinds::VARIABLE_DECLARATION_FRAGMENT)
    ));
}

#[test]
fn test_pipeline_replaced_with_loop_skips_unknown_parameters() {
    let model = class_pair_model(&method(PIPELINE), &method(LOOP), |a, b| {
        let (for_fragment, pipeline) = loop_fragments(b, a, "unrelated");
        vec![Refactoring::ReplacePipelineWithLoop(LoopRewrite {
            fragments_before: vec![pipeline],
            fragments_after: vec![for_fragment],
            ..Default::default()
        })]
    });
    let diffs_differ = ProjectDiffer::new(&model);
    let diffs = diffs_differ.diff();
    assert!(diffs.warnings().is_empty());
    let diff = diffs.get(FILE, FILE).unwrap();
    let (src, dst, store) = (diff.src_tree, diff.dst_tree, &diff.mappings);

    let pipeline = src.parent(first(src, kinds::METHOD_INVOCATION)).unwrap();
    assert!(store.contains(pipeline, first(dst, kinds::ENHANCED_FOR_STATEMENT)));
    assert!(!store.contains_src(first(src, kinds::VARIABLE_DECLARATION_FRAGMENT)));
}

#[test]
fn test_malformed_loop_rewrites_become_warnings() {
    let model = class_pair_model(&method(LOOP), &method(PIPELINE), |a, b| {
        let (for_fragment, pipeline) = loop_fragments(a, b, "item");
        let (_, stray) = loop_fragments(a, b, "other");
        let not_a_loop = fragment(FILE, a, first(a, kinds::BLOCK));
        vec![
            Refactoring::ReplaceLoopWithPipeline(LoopRewrite {
                fragments_before: vec![for_fragment.clone()],
                fragments_after: vec![pipeline.clone(), pipeline.clone()],
                ..Default::default()
            }),
            Refactoring::ReplaceLoopWithPipeline(LoopRewrite {
                fragments_before: vec![not_a_loop],
                fragments_after: vec![pipeline],
                ..Default::default()
            }),
            Refactoring::ReplaceLoopWithPipeline(LoopRewrite {
                fragments_before: vec![for_fragment],
                fragments_after: vec![stray],
                ..Default::default()
            }),
        ]
    });
    let diffs_differ = ProjectDiffer::new(&model);
    let diffs = diffs_differ.diff();
    let refactoring = "Replace Loop With Pipeline".to_owned();
    assert_eq!(
        diffs.warnings(),
        &[
            ReconcileWarning::ExpectedSingleFragment {
                refactoring: refactoring.clone(),
                count: 2
            },
            ReconcileWarning::MissingEnhancedFor {
                refactoring: refactoring.clone()
            },
            ReconcileWarning::UnknownLoopVariable {
                refactoring,
                name: "other".into()
            },
        ]
    );

    // The class pair itself still reconciled; no override reached the loop.
    let diff = diffs.get(FILE, FILE).unwrap();
    assert!(diff.mappings.contains(diff.src_tree.root, diff.dst_tree.root));
    assert!(!diff.mappings.contains_src(first(diff.src_tree, kinds::ENHANCED_FOR_STATEMENT)));
}

#[test]
fn test_merge_variable_maps_types_and_names_only() {
    let before = method(
        "(VariableDeclarationStatement PrimitiveType:int (VariableDeclarationFragment SimpleName:a NumberLiteral:1)) \
         (VariableDeclarationStatement PrimitiveType:int (VariableDeclarationFragment SimpleName:b NumberLiteral:2))",
    );
    let after =
        method("(VariableDeclarationStatement PrimitiveType:int (VariableDeclarationFragment SimpleName:ab NumberLiteral:3))");
    let declared = |t: &SyntaxTree, n: usize, name: &str| {
        let fragment = nth(t, kinds::VARIABLE_DECLARATION_FRAGMENT, n);
        VariableDeclaration {
            name: name.into(),
            location: at(FILE, t, fragment),
            type_: Some(TypeRef {
                name: "int".into(),
                location: at(FILE, t, nth(t, kinds::PRIMITIVE_TYPE, n)),
            }),
        }
    };
    let model = class_pair_model(&before, &after, |a, b| {
        vec![Refactoring::MergeVariable(VariableMerge {
            merged: vec![declared(a, 0, "a"), declared(a, 1, "b")],
            new_variable: declared(b, 0, "ab"),
            ..Default::default()
        })]
    });
    let diffs_differ = ProjectDiffer::new(&model);
    let diffs = diffs_differ.diff();
    let diff = diffs.get(FILE, FILE).unwrap();
    let (src, dst, store) = (diff.src_tree, diff.dst_tree, &diff.mappings);

    let new_type = first(dst, kinds::PRIMITIVE_TYPE);
    let new_name = find(dst, kinds::SIMPLE_NAME, "ab");
    assert_eq!(store.srcs(new_type), &[nth(src, kinds::PRIMITIVE_TYPE, 0), nth(src, kinds::PRIMITIVE_TYPE, 1)]);
    assert_eq!(
        store.srcs(new_name),
        &[find(src, kinds::SIMPLE_NAME, "a"), find(src, kinds::SIMPLE_NAME, "b")]
    );
    assert!(!store.contains_src(first(src, kinds::NUMBER_LITERAL)));
    assert!(!store.contains_src(first(src, kinds::VARIABLE_DECLARATION_FRAGMENT)));
}

fn int_variable(t: &SyntaxTree, n: usize, name: &str) -> VariableDeclaration {
    VariableDeclaration {
        name: name.into(),
        location: at(FILE, t, nth(t, kinds::VARIABLE_DECLARATION_FRAGMENT, n)),
        type_: Some(TypeRef {
            name: "int".into(),
            location: at(FILE, t, nth(t, kinds::PRIMITIVE_TYPE, n)),
        }),
    }
}

#[test]
fn test_split_variable_maps_type_and_name_to_each_part() {
    let before =
        method("(VariableDeclarationStatement PrimitiveType:int (VariableDeclarationFragment SimpleName:range NumberLiteral:9))");
    let after = method(
        "(VariableDeclarationStatement PrimitiveType:int (VariableDeclarationFragment SimpleName:low NumberLiteral:0)) \
         (VariableDeclarationStatement PrimitiveType:int (VariableDeclarationFragment SimpleName:high NumberLiteral:9))",
    );
    let model = class_pair_model(&before, &after, |a, b| {
        vec![Refactoring::SplitVariable(VariableSplit {
            old_variable: int_variable(a, 0, "range"),
            split: vec![int_variable(b, 0, "low"), int_variable(b, 1, "high")],
            ..Default::default()
        })]
    });
    let diffs_differ = ProjectDiffer::new(&model);
    let diffs = diffs_differ.diff();
    let diff = diffs.get(FILE, FILE).unwrap();
    let (src, dst, store) = (diff.src_tree, diff.dst_tree, &diff.mappings);

    let old_type = first(src, kinds::PRIMITIVE_TYPE);
    let old_name = find(src, kinds::SIMPLE_NAME, "range");
    assert_eq!(store.dsts(old_type), &[nth(dst, kinds::PRIMITIVE_TYPE, 0), nth(dst, kinds::PRIMITIVE_TYPE, 1)]);
    assert_eq!(
        store.dsts(old_name),
        &[find(dst, kinds::SIMPLE_NAME, "low"), find(dst, kinds::SIMPLE_NAME, "high")]
    );
    assert!(!store.contains_src(first(src, kinds::NUMBER_LITERAL)));
    assert!(!store.contains_src(first(src, kinds::VARIABLE_DECLARATION_STATEMENT)));
}

#[test]
fn test_merged_catch_clauses_link_to_the_union_clause() {
    let catch = |caught: &str| {
        format!("(CatchClause (SingleVariableDeclaration (SimpleType SimpleName:{caught}) SimpleName:e) (Block (ReturnStatement)))")
    };
    let before = method(&format!("(TryStatement (Block) {} {})", catch("IOException"), catch("SQLException")));
    let after = method(
        "(TryStatement (Block) (CatchClause (SingleVariableDeclaration \
         (UnionType (SimpleType SimpleName:IOException) (SimpleType SimpleName:SQLException)) SimpleName:e) \
         (Block (ReturnStatement))))",
    );
    let model = class_pair_model(&before, &after, |a, b| {
        vec![Refactoring::MergeCatch(FragmentMerge {
            merged: vec![
                fragment(FILE, a, nth(a, kinds::CATCH_CLAUSE, 0)),
                fragment(FILE, a, nth(a, kinds::CATCH_CLAUSE, 1)),
            ],
            new: fragment(FILE, b, first(b, kinds::CATCH_CLAUSE)),
            ..Default::default()
        })]
    });
    let diffs_differ = ProjectDiffer::new(&model);
    let diffs = diffs_differ.diff();
    let diff = diffs.get(FILE, FILE).unwrap();
    let (src, dst, store) = (diff.src_tree, diff.dst_tree, &diff.mappings);

    let (first_catch, second_catch) = (nth(src, kinds::CATCH_CLAUSE, 0), nth(src, kinds::CATCH_CLAUSE, 1));
    let union = first(dst, kinds::CATCH_CLAUSE);
    assert_eq!(store.srcs(union), &[first_catch, second_catch]);

    let block = |t: &SyntaxTree, catch: NodeId| t.child(catch, 1).unwrap();
    assert_eq!(
        store.srcs(block(dst, union)),
        &[block(src, first_catch), block(src, second_catch)]
    );
    let name = |t: &SyntaxTree, catch: NodeId| t.child(t.child(catch, 0).unwrap(), 1).unwrap();
    assert_eq!(
        store.srcs(name(dst, union)),
        &[name(src, first_catch), name(src, second_catch)]
    );
    assert!(!store.contains_src(first(src, kinds::TRY_STATEMENT)));
}

#[test]
fn test_inlined_method_body_is_mapped() {
    let statement = "(ExpressionStatement (MethodInvocation SimpleName:flush SimpleName:out))";
    let before = format!(
        "(CompilationUnit (TypeDeclaration SimpleName:Worker \
         (MethodDeclaration SimpleName:run (Block (ExpressionStatement (MethodInvocation SimpleName:drain)))) \
         (MethodDeclaration SimpleName:drain (Block {statement}))))"
    );
    let after = method(statement);
    let model = class_pair_model(&before, &after, |a, b| {
        let (drain, run) = (nth(a, kinds::METHOD_DECLARATION, 1), nth(b, kinds::METHOD_DECLARATION, 0));
        let flush = |t: &SyntaxTree| {
            let name = find(t, kinds::SIMPLE_NAME, "flush");
            t.parent(name).and_then(|call| t.parent(call)).unwrap()
        };
        vec![Refactoring::InlineOperation(OperationBody {
            body_mapper: BodyMapper {
                container1: container(FILE, a, drain, "Worker"),
                container2: container(FILE, b, run, "Worker"),
                mappings: vec![leaf_mapping(fragment(FILE, a, flush(a)), fragment(FILE, b, flush(b)))],
                ..Default::default()
            },
        })]
    });
    let diffs_differ = ProjectDiffer::new(&model);
    let diffs = diffs_differ.diff();
    let diff = diffs.get(FILE, FILE).unwrap();
    let (src, dst, store) = (diff.src_tree, diff.dst_tree, &diff.mappings);

    let flush = |t: &SyntaxTree| find(t, kinds::SIMPLE_NAME, "flush");
    let statement = |t: &SyntaxTree| t.parent(flush(t)).and_then(|call| t.parent(call)).unwrap();
    assert!(store.contains(statement(src), statement(dst)));
    assert!(store.contains(flush(src), flush(dst)));
    assert!(store.contains(find(src, kinds::SIMPLE_NAME, "out"), find(dst, kinds::SIMPLE_NAME, "out")));
    // Only the body statements: the two operations stay apart.
    assert!(!store.contains(nth(src, kinds::METHOD_DECLARATION, 1), first(dst, kinds::METHOD_DECLARATION)));
}

#[test]
fn test_statement_level_refactoring_in_project_list_is_applied() {
    let statement = "(ExpressionStatement (MethodInvocation SimpleName:flush SimpleName:out))";
    let (a, b) = (
        parse(&method(statement)),
        parse(&format!(
            "(CompilationUnit (TypeDeclaration SimpleName:Worker \
             (MethodDeclaration SimpleName:run (Block (ExpressionStatement (MethodInvocation SimpleName:drain)))) \
             (MethodDeclaration SimpleName:drain (Block {statement}))))"
        )),
    );
    let extracted = Refactoring::ExtractOperation(OperationBody {
        body_mapper: BodyMapper {
            container1: container(FILE, &a, nth(&a, kinds::METHOD_DECLARATION, 0), "Worker"),
            container2: container(FILE, &b, nth(&b, kinds::METHOD_DECLARATION, 1), "Worker"),
            mappings: vec![leaf_mapping(
                fragment(FILE, &a, first(&a, kinds::EXPRESSION_STATEMENT)),
                fragment(FILE, &b, nth(&b, kinds::EXPRESSION_STATEMENT, 1)),
            )],
            ..Default::default()
        },
    });
    let model = ModelDiff {
        before: VersionTrees::from_iter([(FILE, a)]),
        after: VersionTrees::from_iter([(FILE, b)]),
        refactorings: vec![extracted],
        ..Default::default()
    };

    let diffs_differ = ProjectDiffer::new(&model);
    let diffs = diffs_differ.diff();
    assert!(diffs.warnings().is_empty());
    let diff = diffs.get(FILE, FILE).unwrap();
    let (src, dst, store) = (diff.src_tree, diff.dst_tree, &diff.mappings);
    assert!(store.contains(first(src, kinds::EXPRESSION_STATEMENT), nth(dst, kinds::EXPRESSION_STATEMENT, 1)));
    assert!(store.contains(find(src, kinds::SIMPLE_NAME, "flush"), find(dst, kinds::SIMPLE_NAME, "flush")));
}
