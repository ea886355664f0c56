// tests/assembly_pipeline.rs

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use opine::assembly::{AssemblyContext, GraphAssembler};
use opine::discovery::ModuleCatalog;
use opine::errors::OpineError;
use opine::task::TaskAction;
use opine::{assemble, execute};
use opine_test_utils::builders::{ConfigBuilder, empty_context, module};
use opine_test_utils::fake_runner::FakeRunner;
use opine_test_utils::with_timeout;

#[test]
fn same_name_yields_the_same_handle() {
    let mut ctx = empty_context();

    let first: *const _ = ctx.module("styles");
    ctx.module("styles").depends("clean");
    let second: *const _ = ctx.module("styles");

    assert!(std::ptr::eq(first, second));
    assert_eq!(ctx.tasks().len(), 1);
    assert_eq!(ctx.tasks().get("styles").unwrap().prerequisites(), ["clean"]);
}

#[test]
fn handle_mutations_from_different_modules_accumulate() {
    let catalog = ModuleCatalog::new()
        .with(module("opine-styles", |ctx: &mut AssemblyContext| {
            ctx.module("styles").depends("clean");
            Ok(())
        }))
        .with(module("opine-lint", |ctx: &mut AssemblyContext| {
            ctx.module("styles").depends("lint");
            ctx.module("lint");
            Ok(())
        }));

    let graph = assemble(ConfigBuilder::new().boxed(), &catalog).unwrap();
    assert_eq!(graph.task("styles").unwrap().prerequisites, ["clean", "lint"]);
}

#[test]
fn required_key_blocks_every_install() {
    common::init_tracing();
    let catalog = ModuleCatalog::new()
        .with(module("opine-deploy", |ctx: &mut AssemblyContext| {
            let bucket = ctx.get_string("deploy.bucket", None);
            ctx.module("upload").action(TaskAction::from_fn(move || {
                println!("uploading to {bucket}");
                Ok(())
            }));
            ctx.add_build("upload");
            Ok(())
        }))
        .with(module("opine-styles", |ctx: &mut AssemblyContext| {
            ctx.module("styles");
            Ok(())
        }));

    let runner = Arc::new(FakeRunner::new());
    let result = execute(ConfigBuilder::new().boxed(), &catalog, runner.clone());

    match result {
        Err(OpineError::MissingRequiredConfig(tree)) => {
            assert_eq!(tree.leaf_paths(), ["deploy.bucket"]);
        }
        other => panic!("expected MissingRequiredConfig, got {other:?}"),
    }
    assert!(runner.installed_names().is_empty());
}

#[test]
fn required_error_message_lists_the_keys() {
    let mut ctx = empty_context();
    ctx.get_config("deploy.bucket", None);

    let err = GraphAssembler::new().assemble(ctx).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("\"bucket\""));
    assert!(message.contains("must be defined"));
}

#[test]
fn empty_key_without_fallback_still_blocks_assembly() {
    let mut ctx = empty_context();
    let value = ctx.get_string("", None);
    assert_eq!(value, "REQUIRED");

    match GraphAssembler::new().assemble(ctx) {
        Err(OpineError::MissingRequiredConfig(tree)) => {
            assert_eq!(tree.leaf_paths(), [""]);
        }
        other => panic!("expected MissingRequiredConfig, got {other:?}"),
    }
}

#[test]
fn post_dependency_becomes_prerequisite_of_target() {
    let catalog = ModuleCatalog::new()
        .with(module("opine-clean", |ctx: &mut AssemblyContext| {
            ctx.module("clean").depended_by(["styles", "scripts"]);
            Ok(())
        }))
        .with(module("opine-styles", |ctx: &mut AssemblyContext| {
            ctx.module("styles").depends("fonts");
            Ok(())
        }));

    let graph = assemble(ConfigBuilder::new().boxed(), &catalog).unwrap();

    assert_eq!(graph.task("styles").unwrap().prerequisites, ["fonts", "clean"]);
    assert!(graph.task("scripts").is_none());
    assert!(graph.task("clean").unwrap().prerequisites.is_empty());
}

#[test]
fn post_dependency_resolves_regardless_of_module_order() {
    let register_target = |ctx: &mut AssemblyContext| -> anyhow::Result<()> {
        ctx.module("b");
        Ok(())
    };
    let register_declarer = |ctx: &mut AssemblyContext| -> anyhow::Result<()> {
        ctx.module("a").depended_by("b");
        Ok(())
    };

    let forward = ModuleCatalog::new()
        .with(module("opine-a", register_declarer))
        .with(module("opine-b", register_target));
    let backward = ModuleCatalog::new()
        .with(module("opine-b", register_target))
        .with(module("opine-a", register_declarer));

    for catalog in [forward, backward] {
        let graph = assemble(ConfigBuilder::new().boxed(), &catalog).unwrap();
        assert_eq!(graph.task("b").unwrap().prerequisites, ["a"]);
    }
}

#[test]
fn build_aggregates_members_in_order() {
    let catalog = ModuleCatalog::new().with(module("opine-assets", |ctx: &mut AssemblyContext| {
        for name in ["scripts", "styles", "images"] {
            ctx.module(name);
        }
        ctx.add_build("scripts");
        ctx.add_build("styles");
        ctx.add_build("images");
        Ok(())
    }));

    let runner = Arc::new(FakeRunner::new());
    execute(ConfigBuilder::new().boxed(), &catalog, runner.clone()).unwrap();

    assert_eq!(runner.prerequisites_of("build"), ["scripts", "styles", "images"]);
    assert_eq!(runner.prerequisites_of("default"), ["build"]);
    assert_eq!(runner.prerequisites_of("deploy"), ["build"]);
    assert_eq!(runner.prerequisites_of("develop"), ["build"]);
}

#[test]
fn module_registered_build_keeps_its_own_prerequisites() {
    let catalog = ModuleCatalog::new().with(module("opine-core", |ctx: &mut AssemblyContext| {
        ctx.module("build").depends("clean");
        ctx.module("deploy").depends("checks");
        ctx.add_build("styles");
        Ok(())
    }));

    let graph = assemble(ConfigBuilder::new().boxed(), &catalog).unwrap();
    assert_eq!(graph.task("build").unwrap().prerequisites, ["clean", "styles"]);
    assert_eq!(graph.task("deploy").unwrap().prerequisites, ["checks", "build"]);
}

#[test]
fn tasks_are_installed_before_builtins() {
    let catalog = ModuleCatalog::new()
        .with(module("opine-styles", |ctx: &mut AssemblyContext| {
            ctx.module("styles");
            ctx.add_build("styles");
            Ok(())
        }))
        .with(module("opine-shadow", |ctx: &mut AssemblyContext| {
            ctx.module("develop").depends("nothing");
            Ok(())
        }));

    let runner = Arc::new(FakeRunner::new());
    execute(ConfigBuilder::new().boxed(), &catalog, runner.clone()).unwrap();

    assert_eq!(
        runner.installed_names(),
        [
            "styles",
            "build",
            "default",
            "deploy",
            "watch",
            "develop",
            "config-defaults"
        ]
    );
    assert_eq!(runner.prerequisites_of("develop"), ["build"]);
}

#[test]
fn modules_outside_the_namespace_are_ignored() {
    let catalog = ModuleCatalog::new()
        .with(module("opine", |ctx: &mut AssemblyContext| {
            ctx.module("core");
            Ok(())
        }))
        .with(module("gulp-opine-images", |ctx: &mut AssemblyContext| {
            ctx.module("images");
            Ok(())
        }));

    let graph = assemble(ConfigBuilder::new().boxed(), &catalog).unwrap();
    assert!(graph.task("images").is_some());
    assert!(graph.task("core").is_none());
}

#[test]
fn runner_failure_stops_installation() {
    let catalog = ModuleCatalog::new().with(module("opine-styles", |ctx: &mut AssemblyContext| {
        ctx.module("styles");
        ctx.module("scripts");
        Ok(())
    }));

    let runner = Arc::new(FakeRunner::rejecting("scripts"));
    let err = execute(ConfigBuilder::new().boxed(), &catalog, runner.clone()).unwrap_err();

    assert!(matches!(err, OpineError::RunnerError(_)));
    assert_eq!(runner.installed_names(), ["styles"]);
}

#[tokio::test]
async fn installed_actions_run_through_the_runner() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let catalog = ModuleCatalog::new().with(module("opine-styles", move |ctx: &mut AssemblyContext| {
        let counter = Arc::clone(&counter);
        ctx.module("styles").action(TaskAction::from_fn(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));
        Ok(())
    }));

    let runner = Arc::new(FakeRunner::new());
    execute(ConfigBuilder::new().boxed(), &catalog, runner.clone()).unwrap();

    with_timeout(runner.run("styles")).await.unwrap();
    with_timeout(runner.run("styles")).await.unwrap();
    with_timeout(runner.run("build")).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
