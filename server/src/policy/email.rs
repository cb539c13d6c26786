//! Email validation.
//!
//! Both validators accept the language of
//! `^([0-9a-zA-Z]([-.\w]*[0-9a-zA-Z])*@{1}([0-9a-zA-Z][-\w]*[0-9a-zA-Z]\.)+[a-zA-Z]{2,9})$`.
//! [`BacktrackingEmailValidator`] runs it as a small program on a backtracking
//! machine, so the nested quantifiers keep their exponential worst case.
//! Pending alternatives live on a heap stack, never the thread stack.
//! [`LinearEmailValidator`] hands the same pattern to the finite-automaton
//! `regex` crate and runs in time linear in the input.

use std::sync::LazyLock;

use regex::Regex;

pub const EMAIL_PATTERN: &str =
    r"^([0-9a-zA-Z]([-.\w]*[0-9a-zA-Z])*@{1}([0-9a-zA-Z][-\w]*[0-9a-zA-Z]\.)+[a-zA-Z]{2,9})$";

pub trait EmailValidator: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_valid(&self, email: &str) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BacktrackingEmailValidator;

impl BacktrackingEmailValidator {
    /// Match result together with the number of instructions executed.
    pub fn evaluate(&self, email: &str) -> (bool, u64) {
        let input: Vec<char> = email.chars().collect();
        Backtracker::new(&input).run()
    }
}

impl EmailValidator for BacktrackingEmailValidator {
    fn name(&self) -> &'static str {
        "backtracking"
    }

    fn is_valid(&self, email: &str) -> bool {
        self.evaluate(email).0
    }
}

static LINEAR_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"));

// Unicode `\w` exactly as the `regex` crate defines it.
static WORD_CHAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A\w\z").expect("word class compiles"));

#[derive(Debug, Clone, Copy, Default)]
pub struct LinearEmailValidator;

impl EmailValidator for LinearEmailValidator {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn is_valid(&self, email: &str) -> bool {
        LINEAR_EMAIL.is_match(email)
    }
}

fn is_word(c: char) -> bool {
    WORD_CHAR.is_match(c.encode_utf8(&mut [0; 4]))
}

#[derive(Debug, Clone, Copy)]
enum Class {
    Alnum,
    Alpha,
    LocalFiller,
    LabelFiller,
    Literal(char),
}

#[derive(Debug, Clone, Copy)]
enum Inst {
    Char(Class),
    /// Try the first target, fall back to the second.
    Split(usize, usize),
    Jump(usize),
    Match,
}

const PROGRAM: [Inst; 32] = [
    // [0-9a-zA-Z]
    Inst::Char(Class::Alnum),
    // ([-.\w]*[0-9a-zA-Z])*
    Inst::Split(2, 7),
    Inst::Split(3, 5),
    Inst::Char(Class::LocalFiller),
    Inst::Jump(2),
    Inst::Char(Class::Alnum),
    Inst::Jump(1),
    // @
    Inst::Char(Class::Literal('@')),
    // ([0-9a-zA-Z][-\w]*[0-9a-zA-Z]\.)+
    Inst::Char(Class::Alnum),
    Inst::Split(10, 12),
    Inst::Char(Class::LabelFiller),
    Inst::Jump(9),
    Inst::Char(Class::Alnum),
    Inst::Char(Class::Literal('.')),
    Inst::Split(8, 15),
    // [a-zA-Z]{2,9}
    Inst::Char(Class::Alpha),
    Inst::Char(Class::Alpha),
    Inst::Split(18, 31),
    Inst::Char(Class::Alpha),
    Inst::Split(20, 31),
    Inst::Char(Class::Alpha),
    Inst::Split(22, 31),
    Inst::Char(Class::Alpha),
    Inst::Split(24, 31),
    Inst::Char(Class::Alpha),
    Inst::Split(26, 31),
    Inst::Char(Class::Alpha),
    Inst::Split(28, 31),
    Inst::Char(Class::Alpha),
    Inst::Split(30, 31),
    Inst::Char(Class::Alpha),
    Inst::Match,
];

/// Backtracking machine over [`PROGRAM`]. Every quantifier is greedy and
/// gives characters back one at a time on failure.
struct Backtracker<'s> {
    input: &'s [char],
    word: Vec<bool>,
}

impl<'s> Backtracker<'s> {
    fn new(input: &'s [char]) -> Self {
        let word = input.iter().map(|&c| is_word(c)).collect();
        Self { input, word }
    }

    fn matches(&self, class: Class, pos: usize) -> bool {
        let Some(&c) = self.input.get(pos) else {
            return false;
        };
        match class {
            Class::Alnum => c.is_ascii_alphanumeric(),
            Class::Alpha => c.is_ascii_alphabetic(),
            Class::LocalFiller => c == '-' || c == '.' || self.word[pos],
            Class::LabelFiller => c == '-' || self.word[pos],
            Class::Literal(expected) => c == expected,
        }
    }

    fn run(&self) -> (bool, u64) {
        let mut steps = 0u64;
        // (pc, pos) alternatives still to explore, most recent first.
        let mut pending: Vec<(usize, usize)> = vec![(0, 0)];

        while let Some((mut pc, mut pos)) = pending.pop() {
            loop {
                steps += 1;
                match PROGRAM[pc] {
                    Inst::Char(class) => {
                        if !self.matches(class, pos) {
                            break;
                        }
                        pc += 1;
                        pos += 1;
                    }
                    Inst::Split(preferred, fallback) => {
                        pending.push((fallback, pos));
                        pc = preferred;
                    }
                    Inst::Jump(target) => pc = target,
                    Inst::Match => {
                        if pos == self.input.len() {
                            return (true, steps);
                        }
                        break;
                    }
                }
            }
        }

        (false, steps)
    }
}
