use std::fs;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use starling::automaton::{
    determinize_mealy, determinize_nfa, mealy_to_moore, minimize_dfa, minimize_mealy,
    minimize_moore, moore_to_mealy,
};
use starling::grammar::{
    cyk, eliminate_unreachable_symbols, reachable_set, regular_grammar_to_dfa,
    to_chomsky_normal_form,
};
use starling::notation::{
    parse_grammar, parse_machine, render_cyk_table, render_dfa, render_grammar, render_mealy,
    render_moore, render_nfa, Machine,
};
use starling::regex;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Write the result to this file instead of stdout
    #[arg(long, global = true)]
    output: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a machine in graph notation to the other output model
    Convert {
        /// File with the machine in graph notation
        input: String,
    },

    /// Determinize a machine in graph notation (a Moore machine is taken
    /// through its Mealy form first)
    Determinize {
        /// File with the machine in graph notation
        input: String,
    },

    /// Minimize a machine in graph notation
    Minimize {
        /// File with the machine in graph notation
        input: String,
    },

    /// Build an NFA from a regular expression
    RegexToNfa {
        /// File with the regular expression
        input: String,

        /// Continue through determinization and DFA minimization
        #[arg(long)]
        minimize: bool,
    },

    /// Build a DFA from a right-linear grammar
    GrammarToDfa {
        /// File with the grammar
        input: String,
    },

    /// Drop unreachable symbols from a grammar
    Normalize {
        /// File with the grammar
        input: String,
    },

    /// Normalize a grammar to Chomsky Normal Form
    Cnf {
        /// File with the grammar
        input: String,
    },

    /// Run the CYK membership test for a word
    Cyk {
        /// File with the grammar
        input: String,

        /// The word to test
        #[arg(long)]
        word: String,
    },
}

fn process(command: &Command) -> Result<String, String> {
    match command {
        Command::Convert { input } => {
            let text = fs::read_to_string(input).map_err(|e| e.to_string())?;
            match parse_machine(&text).map_err(|e| e.to_string())? {
                Machine::Mealy(mealy) => Ok(render_moore(&mealy_to_moore(&mealy))),
                Machine::Moore(moore) => Ok(render_mealy(&moore_to_mealy(&moore))),
            }
        },
        Command::Determinize { input } => {
            let text = fs::read_to_string(input).map_err(|e| e.to_string())?;
            let mealy = match parse_machine(&text).map_err(|e| e.to_string())? {
                Machine::Mealy(mealy) => mealy,
                Machine::Moore(moore) => moore_to_mealy(&moore),
            };
            if mealy.is_deterministic() {
                eprintln!("The machine is already deterministic");
            }
            Ok(render_mealy(&determinize_mealy(&mealy)))
        },
        Command::Minimize { input } => {
            let text = fs::read_to_string(input).map_err(|e| e.to_string())?;
            match parse_machine(&text).map_err(|e| e.to_string())? {
                Machine::Mealy(mealy) => Ok(render_mealy(&minimize_mealy(&mealy))),
                Machine::Moore(moore) => Ok(render_moore(&minimize_moore(&moore))),
            }
        },
        Command::RegexToNfa { input, minimize } => {
            let text = fs::read_to_string(input).map_err(|e| e.to_string())?;
            let ast = regex::parse(text.trim()).map_err(|e| e.to_string())?;
            let nfa = regex::to_nfa(&ast);
            if *minimize {
                Ok(render_dfa(&minimize_dfa(&determinize_nfa(&nfa))))
            } else {
                Ok(render_nfa(&nfa))
            }
        },
        Command::GrammarToDfa { input } => {
            let text = fs::read_to_string(input).map_err(|e| e.to_string())?;
            let grammar = parse_grammar(&text).map_err(|e| e.to_string())?;
            let dfa = regular_grammar_to_dfa(&grammar).map_err(|e| e.to_string())?;
            Ok(render_dfa(&dfa))
        },
        Command::Normalize { input } => {
            let text = fs::read_to_string(input).map_err(|e| e.to_string())?;
            let grammar = parse_grammar(&text).map_err(|e| e.to_string())?;

            let reachable = reachable_set(&grammar);
            let removed: Vec<&str> = grammar
                .nonterminals()
                .iter()
                .filter(|nt| !reachable.contains(*nt))
                .map(|nt| nt.id())
                .collect();

            let mut out = String::new();
            if !removed.is_empty() {
                out.push_str(&format!("Removed unreachable: {}\n\n", removed.join(", ")));
            }
            out.push_str(&render_grammar(&eliminate_unreachable_symbols(&grammar)));
            Ok(out)
        },
        Command::Cnf { input } => {
            let text = fs::read_to_string(input).map_err(|e| e.to_string())?;
            let grammar = parse_grammar(&text).map_err(|e| e.to_string())?;
            Ok(render_grammar(&to_chomsky_normal_form(&grammar)))
        },
        Command::Cyk { input, word } => {
            let text = fs::read_to_string(input).map_err(|e| e.to_string())?;
            let grammar = parse_grammar(&text).map_err(|e| e.to_string())?;
            let cnf = to_chomsky_normal_form(&grammar);
            let result = cyk(&cnf, word);

            let mut out = format!(
                "Grammar (CNF): {} rules\nWord: \"{}\"\nBelongs: {}\n",
                cnf.rules().len(),
                word,
                if result.belongs() { "yes" } else { "no" },
            );
            let table = render_cyk_table(&cnf, word, &result);
            if !table.is_empty() {
                out.push_str(&format!("CYK table:\n{}", table));
            }
            Ok(out)
        },
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    match process(&args.command) {
        Ok(result) => {
            match &args.output {
                Some(path) => {
                    fs::write(path, &result).expect("Could not write to output file");
                },
                None => println!("{}", result),
            }
            ExitCode::SUCCESS
        },
        Err(message) => {
            eprintln!("Error: {}", message);
            ExitCode::FAILURE
        },
    }
}
