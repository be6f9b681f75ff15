use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::{info, LevelFilter};
use petal_infer::{infer, Builtin, FunDef, Node, Options, Program, StructDef, Type, TypeTable};
use std::collections::BTreeSet;

#[derive(Parser, Debug)]
#[command(author, version, about = "Infers and prints the types of built-in sample programs")]
struct Cli {
    /// Log every constraint and binding.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Sample to run; all of them when omitted.
    #[arg(short, long, value_enum)]
    scenario: Option<Scenario>,

    /// Function whose return type is forced to int.
    #[arg(long, default_value = "main")]
    entry_point: String,
}

#[derive(ValueEnum, Clone, Copy, PartialEq, Eq, Debug)]
enum Scenario {
    Arithmetic,
    Array,
    Branches,
    EmptyArray,
    Coroutine,
    Structs,
    Closure,
}

impl Scenario {
    fn program(self) -> Program {
        let none = Vec::<String>::new;
        match self {
            Self::Arithmetic => Program::new([FunDef::new(
                "main",
                none(),
                vec![
                    Node::assign(Node::ident("a"), Node::int(6)),
                    Node::assign(Node::ident("b"), Node::int(7)),
                    Node::assign(Node::ident("d"), Node::add(Node::add(Node::ident("a"), Node::ident("b")), Node::int(78))),
                    Node::ret(Node::ident("d")),
                ],
            )]),
            Self::Array => Program::new([FunDef::new(
                "main",
                none(),
                vec![
                    Node::assign(Node::ident("arr"), Node::Array(vec![Node::int(5), Node::int(6), Node::int(7)])),
                    Node::ret(Node::index(Node::ident("arr"), Node::int(1))),
                ],
            )]),
            Self::Branches => Program::new([FunDef::new(
                "pick",
                ["flag"],
                vec![
                    Node::if_(Node::ident("flag"), vec![Node::ret(Node::int(1))]),
                    Node::ret(Node::float(2.5)),
                ],
            )]),
            Self::EmptyArray => Program::new([FunDef::new(
                "main",
                none(),
                vec![
                    Node::for_iter(Node::ident("item"), Node::Array(vec![]), vec![Node::assign(Node::ident("last"), Node::ident("item"))]),
                    Node::ret(Node::int(0)),
                ],
            )]),
            Self::Coroutine => Program::new([
                FunDef::new("count", none(), vec![Node::yield_(Node::int(1)), Node::yield_(Node::int(2))]),
                FunDef::new(
                    "main",
                    none(),
                    vec![
                        Node::assign(Node::ident("gen"), Node::call(Node::ident("count"), [])),
                        Node::ret(Node::builtin(Builtin::Next, [Node::ident("gen")])),
                    ],
                ),
            ]),
            Self::Structs => Program::new([
                FunDef::new("get_x", ["p"], vec![Node::ret(Node::access(Node::ident("p"), "x"))]),
                FunDef::new(
                    "main",
                    none(),
                    vec![Node::ret(Node::call(Node::ident("get_x"), [Node::call(Node::ident("Point"), [Node::int(1), Node::int(2)])]))],
                ),
            ])
            .with_struct(StructDef::new("Point", [("x", Type::Int), ("y", Type::Int)]))
            .with_struct(StructDef::new("Label", [("x", Type::String)])),
            Self::Closure => Program::new([
                FunDef::new(
                    "add_captured",
                    ["env", "n"],
                    vec![Node::ret(Node::add(Node::tuple_access(Node::ident("env"), 0), Node::ident("n")))],
                ),
                FunDef::new(
                    "main",
                    none(),
                    vec![
                        Node::assign(Node::ident("inc"), Node::closure("add_captured", Node::Tuple(vec![Node::int(1)]))),
                        Node::ret(Node::call(Node::ident("inc"), [Node::int(41)])),
                    ],
                ),
            ]),
        }
    }
}

fn print_table(program: &Program, table: &TypeTable) {
    for (name, ty) in table.functions() {
        println!("  {name}: {ty}");
    }
    let mut lines = BTreeSet::new();
    for fun in &program.funcs {
        for line in &fun.body {
            line.walk(&mut |node| {
                if let Some(ty) = table.get(node) {
                    lines.insert(format!("{node}: {ty}"));
                }
            });
        }
    }
    lines.iter().for_each(|line| println!("    {line}"));
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("{}: {}", record.level().to_string().to_lowercase(), message))
        })
        .level(if cli.verbose { LevelFilter::Trace } else { LevelFilter::Info })
        .chain(std::io::stderr())
        .apply()
        .context("failed to install logger")?;

    let options = Options::with_entry_point(cli.entry_point);
    let scenarios = match cli.scenario {
        Some(scenario) => vec![scenario],
        None => Scenario::value_variants().to_vec(),
    };
    for scenario in scenarios {
        let program = scenario.program();
        info!("inferring {scenario:?}");
        for fun in &program.funcs {
            println!("{fun}");
        }
        match infer(&program, &options) {
            Ok(table) => print_table(&program, &table),
            Err(e) => println!("  error: {e}"),
        }
    }
    Ok(())
}
