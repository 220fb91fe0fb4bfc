//! Shapes and documents shared by the integration tests.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use typed_patch::{Patchable, Shape, ShapeRef};

pub fn todo_shape() -> ShapeRef {
    static SHAPE: OnceLock<ShapeRef> = OnceLock::new();
    SHAPE
        .get_or_init(|| {
            Shape::record("Todo")
                .field("id", Shape::optional(Shape::integer()))
                .field("description", Shape::optional(Shape::string()))
                .field("complete", Shape::boolean())
                .field("items", Shape::list(Shape::string()))
                .field("uninitialized", Shape::optional(Shape::list(Shape::string())))
                .build()
        })
        .clone()
}

/// A list of todos.
pub fn todos_shape() -> ShapeRef {
    static SHAPE: OnceLock<ShapeRef> = OnceLock::new();
    SHAPE.get_or_init(|| Shape::list(todo_shape())).clone()
}

/// `{"todoList": {"todos": [...]}}`
pub fn wrapper_shape() -> ShapeRef {
    static SHAPE: OnceLock<ShapeRef> = OnceLock::new();
    SHAPE
        .get_or_init(|| {
            let list = Shape::record("TodoList").field("todos", todos_shape()).build();
            Shape::record("Wrapper").field("todoList", list).build()
        })
        .clone()
}

pub fn hobbit_shape() -> ShapeRef {
    static SHAPE: OnceLock<ShapeRef> = OnceLock::new();
    SHAPE
        .get_or_init(|| {
            Shape::record("Hobbit")
                .field("name", Shape::string())
                .field("nickname", Shape::optional(Shape::string()))
                .field("count", Shape::integer())
                .field("weight", Shape::float())
                .field("tags", Shape::list(Shape::string()))
                .field("rings", Shape::set(Shape::string()))
                .field("friends", Shape::map(Shape::string()))
                .build()
        })
        .clone()
}

pub fn todo(id: i64, description: &str, complete: bool, items: &[&str]) -> Value {
    json!({
        "id": id,
        "description": description,
        "complete": complete,
        "items": items,
        "uninitialized": null,
    })
}

pub fn todos() -> Value {
    json!([
        todo(1, "first", false, &["a"]),
        todo(2, "second", true, &["b", "c"]),
        todo(3, "third", false, &[]),
    ])
}

pub fn bilbo() -> Value {
    json!({
        "name": "Bilbo",
        "nickname": null,
        "count": 5,
        "weight": 42.5,
        "tags": ["burglar", "hobbit"],
        "rings": ["one"],
        "friends": {"gandalf": "wizard"},
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: Option<i64>,
    pub description: Option<String>,
    pub complete: bool,
    pub items: Vec<String>,
    pub uninitialized: Option<Vec<String>>,
}

impl Patchable for Todo {
    fn shape() -> ShapeRef {
        todo_shape()
    }
}
