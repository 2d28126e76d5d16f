//! A nested store: a root counter, namespaced modules `a` and `b/c`, and
//! plain modules `d` and `e` that share `b/c`'s namespace.
//!
//! The default subscriber prints `info` events: store construction, module
//! registration, and one logger line per mutation.

use canopy_store::{LoggerPlugin, ModuleDefinition, Store};
use serde_json::{json, Value};
use tracing::info;

fn add_num(state: &mut Value, payload: &Value) {
    let next = state["num"].as_i64().unwrap_or(0) + payload.as_i64().unwrap_or(0);
    state["num"] = json!(next);
}

fn module(name: &'static str, age: &str) -> ModuleDefinition {
    ModuleDefinition::new(json!({ "age": age })).mutation("addNum", move |_, payload| {
        info!(module = name, %payload, "addNum");
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let root = ModuleDefinition::new(json!({
        "name": "yyh123",
        "num": 22,
        "title": "learning",
    }))
    .getter("title", |state| {
        json!(format!("yyh123 {}", state["title"].as_str().unwrap_or("")))
    })
    .mutation("addNum", add_num)
    .mutation("minusNum", |state, payload| {
        let next = state["num"].as_i64().unwrap_or(0) - payload.as_i64().unwrap_or(0);
        state["num"] = json!(next);
    })
    .mutation("changeName", |state, payload| state["name"] = payload.clone())
    .action("changeName", |store, payload| {
        store.commit("changeName", payload.clone())
    })
    .module("a", module("a", "a100").namespaced(true))
    .module(
        "b",
        module("b", "b100").namespaced(true).module(
            "c",
            module("c", "c100").namespaced(true).module(
                "d",
                ModuleDefinition::new(json!({"age": "d100"}))
                    .module("e", ModuleDefinition::new(json!({"age": "e100"}))),
            ),
        ),
    );

    let store = Store::builder(root)
        .strict(true)
        .plugin(LoggerPlugin::new())
        .build()?;

    println!("mutations: {:?}", store.mutation_names());
    println!("title: {}", store.getter("title")?);

    store.commit("addNum", json!(10))?;
    store.commit("b/c/addNum", json!(1))?;
    store.dispatch("changeName", json!("canopy"))?;

    store.register_module("m", ModuleDefinition::new(json!({"age": "m100"})))?;

    // A direct write: strict mode reports it.
    store.set_state(&["num"], json!(0))?;
    for violation in store.strict_violations() {
        println!("violation: {violation}");
    }

    println!("{}", serde_json::to_string_pretty(&store.state())?);
    Ok(())
}
