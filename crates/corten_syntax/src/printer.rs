use alloc::string::String;
use core::fmt::Write;

use crate::ast::Stmt;

const INDENT: &str = "  ";

// -----------------------------------------------------------------------------
// print

/// Serializes a statement tree to formatted text.
///
/// Formatting is purely cosmetic; which statements appear, in what order and
/// with what nesting is fixed by whoever built the tree. Attributes print as
/// `name = literal`, blocks as `name { ... }` with two-space indentation, and
/// empty blocks stay on one line as `name { }`.
///
/// # Examples
///
/// ```
/// use corten_syntax::{parse, print};
///
/// let stmts = parse("server{addr=\"0.0.0.0\"\nlimit=10}").unwrap();
/// assert_eq!(print(&stmts), "server {\n  addr = \"0.0.0.0\"\n  limit = 10\n}\n");
/// ```
pub fn print(stmts: &[Stmt]) -> String {
    let mut out = String::new();
    print_body(&mut out, stmts, 0);
    out
}

fn print_body(out: &mut String, stmts: &[Stmt], depth: usize) {
    for stmt in stmts {
        for _ in 0..depth {
            out.push_str(INDENT);
        }
        match stmt {
            Stmt::Attribute(attr) => {
                // Writing to a `String` cannot fail.
                let _ = writeln!(out, "{} = {}", attr.name, attr.value);
            }
            Stmt::Block(block) if block.body.is_empty() => {
                let _ = writeln!(out, "{} {{ }}", block.name);
            }
            Stmt::Block(block) => {
                let _ = writeln!(out, "{} {{", block.name);
                print_body(out, &block.body, depth + 1);
                for _ in 0..depth {
                    out.push_str(INDENT);
                }
                out.push_str("}\n");
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
