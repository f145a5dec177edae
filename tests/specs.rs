extern crate lore_views;
use lore_views::{Engine, Map, RenderError, TemplateMap, Value, YamlValue};

use std::{fs, collections::BTreeMap};
use serde::Deserialize;

#[test]
fn interpolation_test() -> Result<(), String> {
    run_spec_file("interpolation.yml", false)
}

#[test]
fn sections_test() -> Result<(), String> {
    run_spec_file("sections.yml", false)
}

#[test]
fn layouts_test() -> Result<(), String> {
    run_spec_file("layouts.yml", false)
}

#[test]
fn partials_test() -> Result<(), String> {
    run_spec_file("partials.yml", false)
}

#[test]
fn helpers_test() -> Result<(), String> {
    run_spec_file("helpers.yml", false)
}


fn run_spec_file(path: &str, log: bool) -> Result<(), String> {
    yaml_spec(path)?
        .tests
        .iter()
        .fold(
            Ok(()),
            |acc, test| match (acc, run_spec_test(test, log)) {
                (acc, Ok(())) => acc,
                (Ok(()), Err(name)) => Err(format!("specs ({}): {}", path, name)),
                (Err(err), Err(name)) => Err(format!("{}, {}", err, name))
            }
        )
}

#[derive(Deserialize, Debug)]
struct YamlSpecFile {
    tests: Vec<YamlTestSpec>,
}

#[derive(Deserialize, Debug)]
struct YamlTestSpec {
    name: String,
    templates: BTreeMap<String, String>,
    render: String,
    #[serde(default)]
    data: YamlValue,
    expected: Option<String>,
    error: Option<String>,
}

fn yaml_spec(name: &str) -> Result<YamlSpecFile, String> {
    let path = format!("tests/specs/{}", name);
    let text = fs::read_to_string(path).map_err(
        |err| format!("io: {}", err)
    )?;
    serde_yaml::from_str::<YamlSpecFile>(&text).map_err(
        |err| format!("yaml: {}", err)
    )
}

fn run_spec_test(test: &YamlTestSpec, log: bool) -> Result<(), String> {
    let data = Value::from(&test.data)
        .as_mapping()
        .cloned()
        .unwrap_or_default();
    let result = render(test, data);
    let received = match &result {
        Ok(output) => format!("output {:?}", output),
        Err(err) => format!("error {} ({})", error_kind(err), err),
    };
    let passed = match (&result, &test.expected, &test.error) {
        (Ok(output), Some(expected), None) => output == expected,
        (Err(err), None, Some(kind)) => error_kind(err) == kind.as_str(),
        _ => false
    };
    if passed {
        if log {
            println!("{}: ok", test.name);
        }
        Ok(())
    } else {
        println!("{}: fail", test.name);
        println!("expected:\n{:?} {:?}", test.expected, test.error);
        println!("received:\n{}\n", received);
        Err(test.name.clone())
    }
}

fn render(test: &YamlTestSpec, data: Map) -> Result<String, RenderError> {
    let templates = TemplateMap::from_sources(
        test.templates.iter().map(|(name, source)| (name.as_str(), source.as_str()))
    )?;
    Engine::new(templates).render(&test.render, data)
}

fn error_kind(err: &RenderError) -> &'static str {
    match err {
        RenderError::TemplateNotFound(_) => "not_found",
        RenderError::NestedSection { .. } => "nested_section",
        RenderError::NoOpenSection => "no_open_section",
        RenderError::Execution { .. } => "execution",
    }
}
