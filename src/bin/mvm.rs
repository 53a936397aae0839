//! MiniVM shell
//!
//! Interactive heap driver and script runner. Commands push scalars,
//! build pairs, force collections, and inspect the heap.

use minivm::Vm;
use regex::Regex;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

const HELP: &str = "commands:
  push <int>  allocate a scalar and push it
  pair        pop two values and push a pair of them
  pop         pop the top value
  print       show the value on top of the stack
  gc          force a collection
  live        number of live heap objects
  threshold   current collection threshold
  help        this text
  quit        exit";

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        // Run a script file
        run_file(&args[1]);
    } else {
        // Interactive shell
        run_repl();
    }
}

fn run_file(filename: &str) {
    let source = match std::fs::read_to_string(filename) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading {}: {}", filename, e);
            std::process::exit(1);
        }
    };

    let mut vm = Vm::new();
    let push_re = push_regex();

    for (lineno, line) in source.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match eval_line(&mut vm, &push_re, line) {
            Ok(Some(output)) => println!("{}", output),
            Ok(None) => {}
            Err(e) => {
                eprintln!("{}:{}: {}", filename, lineno + 1, e);
                std::process::exit(1);
            }
        }
    }
}

fn run_repl() {
    println!("MiniVM shell");
    println!("Type `help` for commands, Ctrl+D to exit.\n");

    let mut vm = Vm::new();
    let push_re = push_regex();
    let mut rl = DefaultEditor::new().expect("failed to initialize line editor");

    loop {
        match rl.readline("> ") {
            Ok(line) => {
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }
                if line == "quit" || line == "exit" {
                    break;
                }
                let _ = rl.add_history_entry(&line);

                match eval_line(&mut vm, &push_re, &line) {
                    Ok(Some(output)) => println!("{}", output),
                    Ok(None) => {}
                    Err(e) => println!("Error: {}", e),
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => {
                println!();
                break;
            }
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
        }
    }
}

fn push_regex() -> Regex {
    Regex::new(r"^push\s+(-?\d+)$").unwrap()
}

/// Execute one shell command against the VM
///
/// Returns the text to print, if any.
fn eval_line(vm: &mut Vm, push_re: &Regex, line: &str) -> Result<Option<String>, String> {
    if let Some(caps) = push_re.captures(line) {
        let value: i64 = caps[1]
            .parse()
            .map_err(|_| format!("integer out of range: {}", &caps[1]))?;
        let obj = vm.new_scalar(value).map_err(|e| e.to_string())?;
        return Ok(Some(format!("pushed {}", vm.display(obj))));
    }

    match line {
        "pair" => {
            let obj = vm.new_pair().map_err(|e| e.to_string())?;
            Ok(Some(format!("paired {}", vm.display(obj))))
        }
        "pop" => {
            let obj = vm.pop().map_err(|e| e.to_string())?;
            Ok(Some(format!("popped {}", vm.display(obj))))
        }
        "print" => match vm.peek() {
            Some(obj) => Ok(Some(vm.display(obj).to_string())),
            None => Err("stack is empty".to_string()),
        },
        "gc" => {
            let stats = vm.collect();
            Ok(Some(format!(
                "collected {}, {} remaining",
                stats.collected, stats.remaining
            )))
        }
        "live" => Ok(Some(vm.live_count().to_string())),
        "threshold" => Ok(Some(vm.threshold().to_string())),
        "help" => Ok(Some(HELP.to_string())),
        _ => Err(format!("unknown command: {} (try `help`)", line)),
    }
}
