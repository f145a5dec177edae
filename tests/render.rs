extern crate lore_views;
use lore_views::{Config, Engine, ExecutionError, Map, RenderError, TemplateMap, Value};

use std::sync::Arc;
use std::thread;


fn engine(sources: &[(&str, &str)]) -> Engine {
    Engine::new(TemplateMap::from_sources(sources.iter().copied()).unwrap())
}

fn data(pairs: &[(&str, &str)]) -> Map {
    pairs.iter()
        .map(|(k, v)| (k.to_string(), Value::from(*v)))
        .collect::<Map>()
}


#[test]
fn hello_gandalf() {
    let engine = engine(&[("a", "Hello, {{name}}")]);
    let result = engine.render("a", data(&[("name", "Gandalf")])).unwrap();
    assert_eq!(result, "Hello, Gandalf");
}

#[test]
fn dashboard_title() {
    let engine = engine(&[
        ("b", "{{@section title}}Dashboard{{@endsection}}{{@extends base}}"),
        ("base", "<h1>{{@yield title}}</h1>"),
    ]);
    assert_eq!(engine.render("b", Map::new()).unwrap(), "<h1>Dashboard</h1>");
}

#[test]
fn unresolvable_name() {
    let engine = engine(&[]);
    let err = engine.render("nonexistent/template", Map::new()).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn begin_section_twice() {
    let engine = engine(&[]);
    let mut ctx = engine.context(Map::new());
    ctx.begin_section("a").unwrap();
    let err = ctx.begin_section("a").unwrap_err();
    assert!(matches!(err, RenderError::NestedSection { open, requested } if open == "a" && requested == "a"));
}

#[test]
fn end_section_when_idle() {
    let engine = engine(&[]);
    let mut ctx = engine.context(Map::new());
    assert!(matches!(ctx.end_section(), Err(RenderError::NoOpenSection)));
}

#[test]
fn yield_missing_section() {
    let engine = engine(&[]);
    let ctx = engine.context(Map::new());
    assert_eq!(ctx.yield_section("missing", "fallback"), "fallback");
    assert_eq!(ctx.yield_section("missing", ""), "");
}

#[test]
fn partial_sections_do_not_reach_includer() {
    let engine = engine(&[
        ("widgets/title", "{{@section title}}{{label}}{{@endsection}}widget"),
    ]);
    let mut ctx = engine.context(Map::new());
    ctx.include_partial("widgets/title", data(&[("label", "Inner")])).unwrap();
    assert_eq!(ctx.yield_section("title", "none"), "none");
}

#[test]
fn partial_override_takes_precedence() {
    let engine = engine(&[("card", "{{name}} in {{campaign}}")]);
    let ctx = engine.context(data(&[("name", "outer"), ("campaign", "Arda")]));
    let output = ctx.render_partial("card", data(&[("name", "Bree")])).unwrap();
    assert_eq!(output, "Bree in Arda");
}

#[test]
fn last_declared_layout_is_used() {
    // `first` does not exist and is never resolved
    let engine = engine(&[
        ("page", "{{@extends first}}{{@extends frame}}body"),
        ("frame", "[{{@yield}}|{{@yield side \"-\"}}]"),
    ]);
    assert_eq!(engine.render("page", Map::new()).unwrap(), "[body|-]");
}

#[test]
fn sections_do_not_leak_between_renders() {
    let engine = engine(&[
        ("with_title", "{{@extends base}}{{@section title}}Moria{{@endsection}}"),
        ("without_title", "{{@extends base}}"),
        ("base", "<h1>{{@yield title \"Lore\"}}</h1>"),
    ]);
    assert_eq!(engine.render("with_title", Map::new()).unwrap(), "<h1>Moria</h1>");
    assert_eq!(engine.render("without_title", Map::new()).unwrap(), "<h1>Lore</h1>");
}

#[test]
fn failed_render_reports_template() {
    let engine = engine(&[
        ("page", "{{@extends layouts/broken}}"),
        ("layouts/broken", "{{@section a}}"),
    ]);
    let err = engine.render("page", Map::new()).unwrap_err();
    match err {
        RenderError::Execution { template, source: ExecutionError::UnclosedSection(name) } => {
            assert_eq!(template, "layouts/broken");
            assert_eq!(name, "a");
        },
        other => panic!("unexpected {:?}", other),
    }
}

fn shallow_engine(sources: &[(&str, &str)]) -> Engine {
    let config = Config { max_depth: 2, ..Config::default() };
    Engine::with_config(TemplateMap::from_sources(sources.iter().copied()).unwrap(), config)
}

#[test]
fn layout_chain_depth_is_bounded() {
    let engine = shallow_engine(&[
        ("deep", "{{@extends page}}d"),
        ("page", "{{@extends l1}}p"),
        ("l1", "{{@extends l2}}1{{@yield}}"),
        ("l2", "2{{@yield}}"),
    ]);
    assert_eq!(engine.render("page", Map::new()).unwrap(), "21p");
    match engine.render("deep", Map::new()).unwrap_err() {
        RenderError::Execution { template, source: ExecutionError::DepthExceeded(2) } => {
            assert_eq!(template, "l1");
        },
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn partial_depth_is_bounded() {
    let engine = shallow_engine(&[
        ("outer", "{{>p0}}"),
        ("p0", "0{{>p1}}"),
        ("p1", "1{{>p2}}"),
        ("p2", "2"),
    ]);
    assert_eq!(engine.render("p0", Map::new()).unwrap(), "012");
    let err = engine.render("outer", Map::new()).unwrap_err();
    assert!(matches!(
        err,
        RenderError::Execution { source: ExecutionError::DepthExceeded(2), .. }
    ));
}

#[test]
fn layout_cycle_stops_at_max_depth() {
    let engine = engine(&[("loop", "{{@extends loop}}")]);
    let err = engine.render("loop", Map::new()).unwrap_err();
    assert!(matches!(
        err,
        RenderError::Execution { source: ExecutionError::DepthExceeded(32), .. }
    ));
}

#[test]
fn fluent_data() {
    let engine = engine(&[("entities/show", "{{entity.name}} ({{count}})")]);
    let mut entity = Map::new();
    entity.insert("name".to_owned(), "Anduril".into());
    let page = engine.view()
        .with("entity", entity)
        .with_data(data(&[("count", "2")]))
        .render("entities/show")
        .unwrap();
    assert_eq!(page, "Anduril (2)");
}

#[test]
fn serialized_data() {
    #[derive(serde::Serialize)]
    struct Relation { from: &'static str, to: &'static str }

    let engine = engine(&[("relations", "{{#relations}}{{from}}->{{to}};{{/relations}}")]);
    let relations = vec![
        Relation { from: "Frodo", to: "Sam" },
        Relation { from: "Sam", to: "Rosie" },
    ];
    let page = engine.view()
        .with_serialized("relations", &relations)
        .unwrap()
        .render("relations")
        .unwrap();
    assert_eq!(page, "Frodo-&gt;Sam;Sam-&gt;Rosie;");
}

#[test]
fn custom_helpers() {
    let mut engine = engine(&[("tag", "{{#upper}}{{name}}{{/upper}} {{label}}")]);
    engine.register_helper("upper", |text| text.to_uppercase());
    engine.set_escape(|text| text.replace('<', "[lt]"));
    let page = engine.render("tag", data(&[("name", "mordor"), ("label", "<b>")])).unwrap();
    assert_eq!(page, "MORDOR [lt]b>");
}

#[test]
fn concurrent_renders_are_isolated() {
    let engine = Arc::new(engine(&[
        ("page", "{{@extends base}}{{@section title}}{{name}}{{@endsection}}{{name}}"),
        ("base", "{{@yield title}}:{{@yield}}"),
    ]));
    let handles = (0..8)
        .map(|i| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let name = format!("entity-{}", i);
                let output = engine.render("page", data(&[("name", name.as_str())])).unwrap();
                (name, output)
            })
        })
        .collect::<Vec<_>>();
    for handle in handles {
        let (name, output) = handle.join().unwrap();
        assert_eq!(output, format!("{}:{}", name, name));
    }
}
