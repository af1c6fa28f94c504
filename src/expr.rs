//! Expression tree definitions and helpers.

use std::collections::BTreeSet;
use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};

pub type Rational = BigRational;

/// Names that evaluate to constants rather than free variables.
pub const CONSTANT_NAMES: &[&str] = &["pi", "π", "e", "tau", "phi", "Infinity", "∞", "i"];

#[derive(Clone, PartialEq, Debug)]
pub enum Expr {
    Variable(String),
    Constant(Rational),
    Float(f64),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
    Factorial(Box<Expr>),
    Call(Function, Vec<Expr>),
    Matrix(Vec<Vec<Expr>>),
    Equation(Box<Expr>, Box<Expr>),
    Inequality(Box<Expr>, Relation, Box<Expr>),
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Relation {
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    NotEqual,
}

impl Relation {
    pub fn symbol(self) -> &'static str {
        match self {
            Relation::Less => "<",
            Relation::LessEqual => "<=",
            Relation::Greater => ">",
            Relation::GreaterEqual => ">=",
            Relation::NotEqual => "!=",
        }
    }

    pub fn holds(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Relation::Less => lhs < rhs,
            Relation::LessEqual => lhs <= rhs,
            Relation::Greater => lhs > rhs,
            Relation::GreaterEqual => lhs >= rhs,
            Relation::NotEqual => lhs != rhs,
        }
    }

    pub fn is_strict(self) -> bool {
        matches!(self, Relation::Less | Relation::Greater | Relation::NotEqual)
    }
}

/// Accepted argument counts for a function.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Arity {
    Exact(usize),
    Range(usize, usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == n,
            Arity::Range(lo, hi) => (lo..=hi).contains(&count),
            Arity::AtLeast(n) => count >= n,
        }
    }
}

macro_rules! functions {
    ($($variant:ident => $name:literal, $arity:expr;)*) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        pub enum Function {
            $($variant,)*
        }

        impl Function {
            pub const ALL: &'static [Function] = &[$(Function::$variant,)*];

            pub fn name(self) -> &'static str {
                match self {
                    $(Function::$variant => $name,)*
                }
            }

            pub fn arity(self) -> Arity {
                match self {
                    $(Function::$variant => $arity,)*
                }
            }
        }
    };
}

functions! {
    Sin => "sin", Arity::Exact(1);
    Cos => "cos", Arity::Exact(1);
    Tan => "tan", Arity::Exact(1);
    Sec => "sec", Arity::Exact(1);
    Csc => "csc", Arity::Exact(1);
    Cot => "cot", Arity::Exact(1);
    Asin => "asin", Arity::Exact(1);
    Acos => "acos", Arity::Exact(1);
    Atan => "atan", Arity::Exact(1);
    Acot => "acot", Arity::Exact(1);
    Asec => "asec", Arity::Exact(1);
    Acsc => "acsc", Arity::Exact(1);
    Sinh => "sinh", Arity::Exact(1);
    Cosh => "cosh", Arity::Exact(1);
    Tanh => "tanh", Arity::Exact(1);
    Coth => "coth", Arity::Exact(1);
    Sech => "sech", Arity::Exact(1);
    Csch => "csch", Arity::Exact(1);
    Asinh => "asinh", Arity::Exact(1);
    Acosh => "acosh", Arity::Exact(1);
    Atanh => "atanh", Arity::Exact(1);
    Exp => "exp", Arity::Exact(1);
    Ln => "ln", Arity::Exact(1);
    Log => "log", Arity::Range(1, 2);
    Log10 => "log10", Arity::Exact(1);
    Sqrt => "sqrt", Arity::Exact(1);
    Abs => "abs", Arity::Exact(1);
    Pow => "pow", Arity::Exact(2);
    Gamma => "gamma", Arity::Exact(1);
    Erf => "erf", Arity::Exact(1);
    Erfc => "erfc", Arity::Exact(1);
    Zeta => "zeta", Arity::Exact(1);
    Beta => "beta", Arity::Exact(2);
    Factorial => "factorial", Arity::Exact(1);
    Binomial => "binomial", Arity::Exact(2);
    BesselJ => "besselJ", Arity::Exact(2);
    BesselY => "besselY", Arity::Exact(2);
    BesselI => "besselI", Arity::Exact(2);
    BesselK => "besselK", Arity::Exact(2);
    Det => "det", Arity::Exact(1);
    Inv => "inv", Arity::Exact(1);
    Transpose => "transpose", Arity::Exact(1);
    Trace => "trace", Arity::Exact(1);
    Dot => "dot", Arity::Exact(2);
    Cross => "cross", Arity::Exact(2);
    Norm => "norm", Arity::Exact(1);
    Mean => "mean", Arity::AtLeast(1);
    Median => "median", Arity::AtLeast(1);
    Std => "std", Arity::AtLeast(1);
    Variance => "variance", Arity::AtLeast(1);
}

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        let canonical = match name {
            "arcsin" => "asin",
            "arccos" => "acos",
            "arctan" => "atan",
            "arccot" => "acot",
            "arcsec" => "asec",
            "arccsc" => "acsc",
            "tr" => "trace",
            "var" => "variance",
            "combinations" => "binomial",
            other => other,
        };
        Function::ALL.iter().copied().find(|f| f.name() == canonical)
    }

    pub fn is_trigonometric(self) -> bool {
        matches!(
            self,
            Function::Sin | Function::Cos | Function::Tan | Function::Sec | Function::Csc | Function::Cot
        )
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Expr {
    pub fn var(name: impl Into<String>) -> Self {
        Expr::Variable(name.into())
    }

    pub fn constant(num: impl Into<BigInt>, den: impl Into<BigInt>) -> Self {
        Expr::Constant(Rational::new(num.into(), den.into()))
    }

    pub fn integer(value: impl Into<BigInt>) -> Self {
        Expr::Constant(Rational::from_integer(value.into()))
    }

    pub fn call(function: Function, args: Vec<Expr>) -> Self {
        Expr::Call(function, args)
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Expr::Constant(r) => r.is_zero(),
            Expr::Float(v) => *v == 0.0,
            _ => false,
        }
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Expr::Constant(r) if r.is_one())
    }

    pub fn as_rational(&self) -> Option<Rational> {
        match self {
            Expr::Constant(r) => Some(r.clone()),
            Expr::Neg(inner) => inner.as_rational().map(|r| -r),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&str> {
        if let Expr::Variable(name) = self {
            Some(name)
        } else {
            None
        }
    }

    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    pub fn contains_var(&self, var: &str) -> bool {
        let mut found = false;
        self.visit(&mut |e: &Expr| {
            if let Expr::Variable(name) = e {
                found |= name == var;
            }
        });
        found
    }

    pub fn contains_matrix(&self) -> bool {
        let mut found = false;
        self.visit(&mut |e: &Expr| found |= matches!(e, Expr::Matrix(_)));
        found
    }

    /// Names of all variables that are not built-in constants.
    pub fn free_variables(&self) -> BTreeSet<String> {
        let mut vars = BTreeSet::new();
        self.visit(&mut |e: &Expr| {
            if let Expr::Variable(name) = e {
                if !CONSTANT_NAMES.contains(&name.as_str()) {
                    vars.insert(name.clone());
                }
            }
        });
        vars
    }

    /// Pre-order walk over every node.
    pub fn visit(&self, f: &mut dyn FnMut(&Expr)) {
        f(self);
        match self {
            Expr::Add(a, b)
            | Expr::Sub(a, b)
            | Expr::Mul(a, b)
            | Expr::Div(a, b)
            | Expr::Pow(a, b)
            | Expr::Equation(a, b)
            | Expr::Inequality(a, _, b) => {
                a.visit(f);
                b.visit(f);
            }
            Expr::Neg(a) | Expr::Factorial(a) => a.visit(f),
            Expr::Call(_, args) => {
                for arg in args {
                    arg.visit(f);
                }
            }
            Expr::Matrix(rows) => {
                for cell in rows.iter().flatten() {
                    cell.visit(f);
                }
            }
            Expr::Variable(_) | Expr::Constant(_) | Expr::Float(_) => {}
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::format::pretty(self))
    }
}

pub fn zero() -> Expr {
    Expr::Constant(Rational::zero())
}

pub fn one() -> Expr {
    Expr::Constant(Rational::one())
}

pub fn rational(num: i64, den: i64) -> Rational {
    Rational::new(num.into(), den.into())
}

pub fn pow(base: Expr, exp: Expr) -> Expr {
    Expr::Pow(base.boxed(), exp.boxed())
}

pub fn add(a: Expr, b: Expr) -> Expr {
    Expr::Add(a.boxed(), b.boxed())
}

pub fn sub(a: Expr, b: Expr) -> Expr {
    Expr::Sub(a.boxed(), b.boxed())
}

pub fn mul(a: Expr, b: Expr) -> Expr {
    Expr::Mul(a.boxed(), b.boxed())
}

pub fn div(a: Expr, b: Expr) -> Expr {
    Expr::Div(a.boxed(), b.boxed())
}

pub fn neg(a: Expr) -> Expr {
    Expr::Neg(a.boxed())
}
