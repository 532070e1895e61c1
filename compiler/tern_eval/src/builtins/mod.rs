//! Built-in functions.
//!
//! Built-ins form a closed set, so they are an enum rather than a registry
//! of trait objects. Each one declares its name, the operand counts it
//! accepts, and whether its operands are evaluated before the call or
//! handed over as written. Handlers read their operands from the call's
//! frame on the evaluation stack.

mod control;
mod debug;
mod generic;
mod io;
mod lists;
mod operators;
mod predicates;
mod rules;
mod strings;

use tern_ir::{Atom, Expr, Form};
use tern_patterns::{arg_range_error, arg_type_error, EvalError, EvalResult};

use crate::stack::CallFrame;
use crate::Evaluator;

/// Operand counts a built-in accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
    Between(usize, usize),
}

impl Arity {
    #[inline]
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
            Arity::Between(lo, hi) => (lo..=hi).contains(&count),
        }
    }

    pub fn describe(self) -> String {
        match self {
            Arity::Exactly(n) => n.to_string(),
            Arity::AtLeast(n) => format!("at least {n}"),
            Arity::Between(lo, hi) => format!("{lo} to {hi}"),
        }
    }
}

/// Whether operands are evaluated before the handler runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operands {
    Evaluated,
    Held,
}

type Handler = fn(&mut Evaluator, Call) -> EvalResult;

macro_rules! builtins {
    ($($variant:ident => $name:literal, $arity:expr, $operands:ident, $handler:path;)*) => {
        /// Every built-in function.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum Builtin {
            $($variant,)*
        }

        impl Builtin {
            pub const ALL: &'static [Builtin] = &[$(Builtin::$variant,)*];

            pub fn name(self) -> &'static str {
                match self {
                    $(Builtin::$variant => $name,)*
                }
            }

            pub fn from_name(name: &str) -> Option<Builtin> {
                match name {
                    $($name => Some(Builtin::$variant),)*
                    _ => None,
                }
            }

            pub fn arity(self) -> Arity {
                match self {
                    $(Builtin::$variant => $arity,)*
                }
            }

            pub fn operands(self) -> Operands {
                match self {
                    $(Builtin::$variant => Operands::$operands,)*
                }
            }

            fn handler(self) -> Handler {
                match self {
                    $(Builtin::$variant => $handler,)*
                }
            }
        }
    };
}

use Arity::{AtLeast, Between, Exactly};

builtins! {
    // Evaluation control
    Hold => "Hold", Exactly(1), Held, control::hold;
    Eval => "Eval", Exactly(1), Evaluated, control::eval;
    Set => "Set", Exactly(2), Held, control::set;
    MacroSet => "MacroSet", Exactly(2), Held, control::macro_set;
    Clear => "Clear", AtLeast(0), Held, control::clear;
    Local => "Local", AtLeast(0), Held, control::local;
    MacroLocal => "MacroLocal", AtLeast(0), Evaluated, control::local;
    Prog => "Prog", AtLeast(0), Held, control::prog;
    While => "While", Exactly(2), Held, control::while_loop;
    If => "If", Between(2, 3), Held, control::if_then;
    Check => "Check", Exactly(2), Held, control::check;
    TrapError => "TrapError", Exactly(2), Held, control::trap_error;
    GetCoreError => "GetCoreError", Exactly(0), Evaluated, control::get_core_error;
    MaxEvalDepth => "MaxEvalDepth", Exactly(1), Evaluated, control::max_eval_depth;
    Equals => "Equals", Exactly(2), Evaluated, control::equals;
    LessThan => "LessThan", Exactly(2), Evaluated, control::less_than;
    GreaterThan => "GreaterThan", Exactly(2), Evaluated, control::greater_than;
    Not => "Not", Exactly(1), Evaluated, control::not;
    And => "And", AtLeast(0), Held, control::and;
    Or => "Or", AtLeast(0), Held, control::or;
    MathAdd => "MathAdd", Exactly(2), Evaluated, control::math_add;
    MathSubtract => "MathSubtract", Exactly(2), Evaluated, control::math_subtract;
    MathMultiply => "MathMultiply", Exactly(2), Evaluated, control::math_multiply;

    // Expressions and lists
    List => "List", AtLeast(0), Evaluated, lists::list;
    Head => "Head", Exactly(1), Evaluated, lists::head;
    Nth => "Nth", Exactly(2), Evaluated, lists::nth;
    Tail => "Tail", Exactly(1), Evaluated, lists::tail;
    Length => "Length", Exactly(1), Evaluated, lists::length;
    UnList => "UnList", Exactly(1), Evaluated, lists::un_list;
    Listify => "Listify", Exactly(1), Evaluated, lists::listify;
    Concat => "Concat", AtLeast(0), Evaluated, lists::concat;
    FlatCopy => "FlatCopy", Exactly(1), Evaluated, lists::flat_copy;
    Delete => "Delete", Exactly(2), Evaluated, lists::delete;
    DestructiveDelete => "DestructiveDelete", Exactly(2), Evaluated, lists::destructive_delete;
    Insert => "Insert", Exactly(3), Evaluated, lists::insert;
    DestructiveInsert => "DestructiveInsert", Exactly(3), Evaluated, lists::destructive_insert;
    Replace => "Replace", Exactly(3), Evaluated, lists::replace;
    DestructiveReplace => "DestructiveReplace", Exactly(3), Evaluated, lists::destructive_replace;
    DestructiveReverse => "DestructiveReverse", Exactly(1), Evaluated, lists::destructive_reverse;
    Type => "Type", Exactly(1), Evaluated, lists::type_of;

    // Strings
    Atomize => "Atom", Exactly(1), Evaluated, strings::atomize;
    Stringify => "String", Exactly(1), Evaluated, strings::stringify;
    ConcatStrings => "ConcatStrings", AtLeast(0), Evaluated, strings::concat_strings;
    StringMidGet => "StringMid'Get", Exactly(3), Evaluated, strings::mid_get;
    StringMidSet => "StringMid'Set", Exactly(3), Evaluated, strings::mid_set;

    // Predicates
    IsFunction => "IsFunction", Exactly(1), Evaluated, predicates::is_function;
    IsAtom => "IsAtom", Exactly(1), Evaluated, predicates::is_atom;
    IsNumber => "IsNumber", Exactly(1), Evaluated, predicates::is_number;
    IsInteger => "IsInteger", Exactly(1), Evaluated, predicates::is_integer;
    IsList => "IsList", Exactly(1), Evaluated, predicates::is_list;
    IsString => "IsString", Exactly(1), Evaluated, predicates::is_string;
    IsBound => "IsBound", Exactly(1), Held, predicates::is_bound;
    IsGeneric => "IsGeneric", Exactly(1), Evaluated, predicates::is_generic;

    // Rule database
    RuleBase => "RuleBase", Exactly(2), Held, rules::rule_base;
    MacroRuleBase => "MacroRuleBase", Exactly(2), Held, rules::rule_base;
    RuleBaseListed => "RuleBaseListed", Exactly(2), Held, rules::rule_base_listed;
    MacroRuleBaseListed => "MacroRuleBaseListed", Exactly(2), Held, rules::rule_base_listed;
    DefMacroRuleBase => "DefMacroRuleBase", Exactly(2), Held, rules::def_macro_rule_base;
    DefMacroRuleBaseListed => "DefMacroRuleBaseListed", Exactly(2), Held, rules::def_macro_rule_base_listed;
    HoldArg => "HoldArg", Exactly(2), Held, rules::hold_arg;
    Rule => "Rule", Exactly(5), Held, rules::rule;
    MacroRule => "MacroRule", Exactly(5), Held, rules::macro_rule;
    RulePattern => "RulePattern", Exactly(5), Held, rules::rule_pattern;
    MacroRulePattern => "MacroRulePattern", Exactly(5), Held, rules::macro_rule_pattern;
    Retract => "Retract", Between(2, 3), Held, rules::retract;
    Fence => "Fence", Exactly(2), Held, rules::fence;
    UnFence => "UnFence", Exactly(2), Held, rules::unfence;
    RuleBaseDefined => "RuleBaseDefined", Exactly(2), Held, rules::rule_base_defined;
    RuleBaseArgList => "RuleBaseArgList", Exactly(2), Held, rules::rule_base_arg_list;

    // Operators
    Infix => "Infix", Exactly(2), Evaluated, operators::infix;
    Prefix => "Prefix", Exactly(2), Evaluated, operators::prefix;
    Postfix => "Postfix", Between(1, 2), Evaluated, operators::postfix;
    Bodied => "Bodied", Exactly(2), Evaluated, operators::bodied;
    RightAssociative => "RightAssociative", Exactly(1), Evaluated, operators::right_associative;
    LeftPrecedence => "LeftPrecedence", Exactly(2), Evaluated, operators::left_precedence;
    RightPrecedence => "RightPrecedence", Exactly(2), Evaluated, operators::right_precedence;
    IsInfix => "IsInfix", Exactly(1), Evaluated, operators::is_infix;
    IsPrefix => "IsPrefix", Exactly(1), Evaluated, operators::is_prefix;
    IsPostfix => "IsPostfix", Exactly(1), Evaluated, operators::is_postfix;
    IsBodied => "IsBodied", Exactly(1), Evaluated, operators::is_bodied;
    OpPrecedence => "OpPrecedence", Exactly(1), Evaluated, operators::op_precedence;
    OpLeftPrecedence => "OpLeftPrecedence", Exactly(1), Evaluated, operators::op_left_precedence;
    OpRightPrecedence => "OpRightPrecedence", Exactly(1), Evaluated, operators::op_right_precedence;

    // Input and output
    Write => "Write", AtLeast(0), Evaluated, io::write;
    WriteString => "WriteString", Exactly(1), Evaluated, io::write_string;
    NewLine => "NewLine", Exactly(0), Evaluated, io::new_line;
    FullForm => "FullForm", Exactly(1), Evaluated, io::full_form;
    ToString => "ToString", Exactly(1), Held, io::to_string;
    ToStdout => "ToStdout", Exactly(1), Held, io::to_stdout;
    ToFile => "ToFile", Exactly(2), Held, io::to_file;
    FindFile => "FindFile", Exactly(1), Evaluated, io::find_file;
    DefaultDirectory => "DefaultDirectory", Exactly(1), Evaluated, io::default_directory;
    SystemCall => "SystemCall", Exactly(1), Evaluated, io::system_call;
    Secure => "Secure", Exactly(1), Held, io::secure;

    // Opaque values
    GenericTypeName => "GenericTypeName", Exactly(1), Evaluated, generic::type_name;
    ArrayCreate => "ArrayCreate", Exactly(2), Evaluated, generic::array_create;
    ArraySize => "ArraySize", Exactly(1), Evaluated, generic::array_size;
    ArrayGet => "ArrayGet", Exactly(2), Evaluated, generic::array_get;
    ArraySet => "ArraySet", Exactly(3), Evaluated, generic::array_set;
    PatternCreate => "PatternCreate", Exactly(2), Held, generic::pattern_create;
    PatternMatches => "PatternMatches", Exactly(2), Evaluated, generic::pattern_matches;

    // Debugging and tracing
    CustomEval => "CustomEval", Exactly(4), Held, debug::custom_eval;
    CustomEvalExpression => "CustomEval'Expression", Exactly(0), Evaluated, debug::expression;
    CustomEvalResult => "CustomEval'Result", Exactly(0), Evaluated, debug::result;
    CustomEvalLocals => "CustomEval'Locals", Exactly(0), Evaluated, debug::locals;
    CustomEvalStop => "CustomEval'Stop", Exactly(0), Evaluated, debug::stop;
    TraceStack => "TraceStack", Exactly(1), Held, debug::trace_stack;
    TraceExp => "TraceExp", Exactly(1), Held, debug::trace_exp;
    TraceRule => "TraceRule", Exactly(2), Held, debug::trace_rule;
}

impl Builtin {
    /// Run the handler for a call whose frame is already filled.
    #[inline]
    pub(crate) fn invoke(self, ev: &mut Evaluator, call: Call) -> EvalResult {
        (self.handler())(ev, call)
    }
}

/// A built-in call in progress: which built-in, and where its operands are.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Call {
    pub frame: CallFrame,
    pub builtin: Builtin,
}

impl Call {
    pub fn new(frame: CallFrame, builtin: Builtin) -> Self {
        Call { frame, builtin }
    }

    #[inline]
    pub fn name(self) -> &'static str {
        self.builtin.name()
    }

    #[inline]
    pub fn arity(self) -> usize {
        self.frame.arity()
    }
}

// Operand access shared by the handlers.
impl Evaluator {
    /// Operand `index` (1-based) of `call`.
    pub(crate) fn arg(&self, call: Call, index: usize) -> Expr {
        self.stack.operand(call.frame, index).clone()
    }

    /// Operand `index`, moved out of the stack for in-place editing.
    pub(crate) fn take_arg(&mut self, call: Call, index: usize) -> Expr {
        self.stack.take_operand(call.frame, index)
    }

    pub(crate) fn atom_arg(&self, call: Call, index: usize) -> Result<Atom, EvalError> {
        match self.stack.operand(call.frame, index) {
            Expr::Atom(atom) => Ok(atom.clone()),
            _ => Err(arg_type_error(call.name(), index, "an atom")),
        }
    }

    /// A symbol given either bare or as a string literal.
    pub(crate) fn symbol_arg(&self, call: Call, index: usize) -> Result<Atom, EvalError> {
        let atom = self.atom_arg(call, index)?;
        if atom.is_string() {
            Ok(atom.unstringified())
        } else {
            Ok(atom)
        }
    }

    /// Contents of a string-literal operand.
    pub(crate) fn string_arg(&self, call: Call, index: usize) -> Result<String, EvalError> {
        match self.stack.operand(call.frame, index) {
            Expr::Atom(atom) if atom.is_string() => Ok(atom.unquoted().to_string()),
            _ => Err(arg_type_error(call.name(), index, "a string")),
        }
    }

    pub(crate) fn form_arg(&self, call: Call, index: usize) -> Result<Form, EvalError> {
        match self.stack.operand(call.frame, index) {
            Expr::Form(form) => Ok(form.clone()),
            _ => Err(arg_type_error(call.name(), index, "a compound expression")),
        }
    }

    pub(crate) fn list_arg(&self, call: Call, index: usize) -> Result<Form, EvalError> {
        let operand = self.stack.operand(call.frame, index);
        match operand {
            Expr::Form(form) if operand.is_list() => Ok(form.clone()),
            _ => Err(arg_type_error(call.name(), index, "a list")),
        }
    }

    pub(crate) fn integer_arg(&self, call: Call, index: usize) -> Result<i64, EvalError> {
        self.stack
            .operand(call.frame, index)
            .as_atom()
            .and_then(|atom| self.numbers.to_index(atom.text()))
            .ok_or_else(|| arg_type_error(call.name(), index, "an integer"))
    }

    /// A positive 1-based index.
    pub(crate) fn index_arg(&self, call: Call, index: usize) -> Result<usize, EvalError> {
        let value = self.integer_arg(call, index)?;
        match usize::try_from(value) {
            Ok(position) if position >= 1 => Ok(position),
            _ => Err(arg_range_error(call.name(), index, format!("index {value} is not positive"))),
        }
    }

    pub(crate) fn count_arg(&self, call: Call, index: usize) -> Result<usize, EvalError> {
        let value = self.integer_arg(call, index)?;
        usize::try_from(value)
            .map_err(|_| arg_range_error(call.name(), index, format!("{value} is negative")))
    }

    /// An operand that must be a number atom.
    pub(crate) fn number_arg(&self, call: Call, index: usize) -> Result<Atom, EvalError> {
        match self.stack.operand(call.frame, index) {
            Expr::Atom(atom) if self.numbers.is_number(atom.text(), true) => Ok(atom.clone()),
            _ => Err(arg_type_error(call.name(), index, "a number")),
        }
    }

    /// Evaluate held operand `index`.
    pub(crate) fn eval_arg(&mut self, call: Call, index: usize) -> EvalResult {
        let operand = self.arg(call, index);
        self.eval(&operand)
    }
}
