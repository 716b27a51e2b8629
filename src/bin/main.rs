use std::io::{self, BufRead, Write};

use avl_arena::{
    render::{Shape, Style},
    AvlTree,
};

const BANNER: &str = "AVL Tree Driver. Version 0.3\nType help to get a list of commands";

const HELP: &str = "
>>> Available commands:
>>>     - insert {key}                          insert a key and print the tree
>>>     - remove {key}                          remove a key and print the tree
>>>     - find {key}                            report whether a key is present
>>>     - min | max                             print the smallest or largest key
>>>     - print                                 print the tree
>>>     - style {horizontal|symmetric|vertical} choose how trees are printed
>>>     - clear                                 remove every key
>>>     - exit | quit | bye                     leave
";

#[derive(Copy, Clone)]
enum Colour {
    Red = 1,
    Yellow = 3,
    Blue = 4,
    Cyan = 6,
}

impl Colour {
    fn paint(self, text: &str) -> String {
        format!("\x1b[3{}m{text}\x1b[0m", self as u8)
    }
}

enum Flow {
    Continue,
    Quit,
}

struct Driver {
    tree: AvlTree<String>,
    style: Style,
}

impl Driver {
    fn new() -> Driver {
        Driver {
            tree: AvlTree::new(),
            style: Style::default(),
        }
    }

    fn dispatch(&mut self, line: &str, out: &mut impl Write) -> io::Result<Flow> {
        let mut words = line.split_whitespace();

        let Some(cmd) = words.next() else {
            return Ok(Flow::Continue);
        };
        let key = words.next();

        match (cmd, key) {
            ("exit" | "quit" | "bye", _) => return Ok(Flow::Quit),

            ("help", _) => write!(out, "{HELP}")?,

            ("print", _) => self.print_tree(out)?,

            ("clear", _) => {
                self.tree.clear();
                log::info!("cleared the tree");
            }

            ("min", _) => match self.tree.minimum() {
                Ok(key) => writeln!(out, "{key}")?,
                Err(e) => error(out, &e.to_string())?,
            },

            ("max", _) => match self.tree.maximum() {
                Ok(key) => writeln!(out, "{key}")?,
                Err(e) => error(out, &e.to_string())?,
            },

            ("style", None) => note(out, "Syntax: style horizontal|symmetric|vertical")?,

            ("insert" | "remove" | "find", None) => note(out, &format!("Syntax: {cmd} key"))?,

            ("insert", Some(key)) => {
                if self.tree.insert(key.to_string()) {
                    log::debug!("inserted {key}");
                    self.print_tree(out)?;
                } else {
                    note(out, &format!("The key {key} already exists"))?;
                }
            }

            ("remove", Some(key)) => {
                if self.tree.remove(key) {
                    log::debug!("removed {key}");
                    self.print_tree(out)?;
                } else {
                    note(out, &format!("The key {key} does not exist"))?;
                }
            }

            ("find", Some(key)) => {
                let verdict = if self.tree.find(key) { "found" } else { "not found" };
                writeln!(out, "{key}: {verdict}")?;
            }

            ("style", Some(name)) => match name.parse() {
                Ok(style) => self.style = style,
                Err(e) => error(out, &e.to_string())?,
            },

            _ => error(out, "Unknown command")?,
        }

        Ok(Flow::Continue)
    }

    fn print_tree(&self, out: &mut impl Write) -> io::Result<()> {
        let rendered = Shape::from_traversals(&self.tree.preorder(), &self.tree.inorder())
            .and_then(|shape| shape.render(self.style));

        match rendered {
            Ok(text) => writeln!(out, "{}", Colour::Cyan.paint(&text)),
            Err(e) => {
                log::error!("failed to render the tree: {e}");
                error(out, &e.to_string())
            }
        }
    }
}

fn note(out: &mut impl Write, msg: &str) -> io::Result<()> {
    writeln!(out, "{}", Colour::Yellow.paint(&format!("Note: {msg}")))
}

fn error(out: &mut impl Write, msg: &str) -> io::Result<()> {
    writeln!(out, "{}", Colour::Red.paint(&format!("Error: {msg}")))
}

fn main() -> io::Result<()> {
    pretty_env_logger::init();

    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    writeln!(stdout, "{}", Colour::Yellow.paint(BANNER))?;

    let mut driver = Driver::new();

    loop {
        write!(stdout, "{}", Colour::Blue.paint("> "))?;
        stdout.flush()?;

        let Some(line) = lines.next() else {
            break;
        };

        if let Flow::Quit = driver.dispatch(&line?, &mut stdout)? {
            break;
        }
    }

    Ok(())
}
