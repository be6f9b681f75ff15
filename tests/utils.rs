#![cfg(test)]

use petal_infer::{infer, FunDef, Node, Options, Program, Result, TypeErrorKind, TypeTable};

#[allow(dead_code)]
pub fn enable_debug_logs() {
    fern::Dispatch::new()
        .level(log::LevelFilter::Debug)
        .chain(std::io::stderr())
        .apply()
        .unwrap();
}

pub fn main_fn(body: Vec<Node>) -> FunDef {
    FunDef::new("main", Vec::<String>::new(), body)
}

#[allow(dead_code)]
pub fn nullary(name: &str, body: Vec<Node>) -> FunDef {
    FunDef::new(name, Vec::<String>::new(), body)
}

pub fn infer_default(program: &Program) -> Result<TypeTable> {
    infer(program, &Options::default())
}

#[allow(dead_code)]
pub fn error_kind(program: &Program) -> TypeErrorKind {
    infer_default(program).expect_err("inference should fail").kind
}
