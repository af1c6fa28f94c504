//! Processor configuration: locale standards, presentation palette and engine tuning.
//!
//! Every section has defaults, so an empty TOML document is a valid config:
//!
//! ```toml
//! [standards]
//! decimal = ","
//! thousands = "."
//!
//! [standards.notation]
//! multiplication = "·"
//!
//! [engine]
//! scan_min = -20.0
//! scan_max = 20.0
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::EngineOptions;
use crate::error::{MathError, Result};
use crate::expr::Function;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    pub standards: Standards,
    pub colors: Colors,
    pub engine: EngineOptions,
    pub dev_server: DevServer,
}

/// Locale conventions used when reading and writing numbers and symbols.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Standards {
    pub decimal: String,
    pub thousands: String,
    pub units: UnitLabels,
    pub notation: NotationGlyphs,
}

impl Default for Standards {
    fn default() -> Self {
        Standards {
            decimal: ",".to_string(),
            thousands: ".".to_string(),
            units: UnitLabels::default(),
            notation: NotationGlyphs::default(),
        }
    }
}

/// Base unit of each unit kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitLabels {
    pub temperature: String,
    pub length: String,
    pub speed: String,
    pub mass: String,
}

impl Default for UnitLabels {
    fn default() -> Self {
        UnitLabels {
            temperature: "°C".to_string(),
            length: "m".to_string(),
            speed: "m/s".to_string(),
            mass: "kg".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotationGlyphs {
    pub multiplication: String,
    pub division: String,
    pub square_root: String,
    pub infinity: String,
    pub pi: String,
    pub euler: String,
    pub imaginary: String,
}

impl Default for NotationGlyphs {
    fn default() -> Self {
        NotationGlyphs {
            multiplication: "·".to_string(),
            division: "÷".to_string(),
            square_root: "√".to_string(),
            infinity: "∞".to_string(),
            pi: "π".to_string(),
            euler: "e".to_string(),
            imaginary: "i".to_string(),
        }
    }
}

/// Presentation palette, as CSS hex colors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Colors {
    pub primary: String,
    pub primary_dark: String,
    pub secondary: String,
    pub background: String,
    pub text: String,
    pub border: String,
    pub success: String,
    pub error: String,
    pub warning: String,
}

impl Default for Colors {
    fn default() -> Self {
        Colors {
            primary: "#2c3e50".to_string(),
            primary_dark: "#1a252f".to_string(),
            secondary: "#3498db".to_string(),
            background: "#f8f9fa".to_string(),
            text: "#2c3e50".to_string(),
            border: "#e9ecef".to_string(),
            success: "#27ae60".to_string(),
            error: "#e74c3c".to_string(),
            warning: "#f39c12".to_string(),
        }
    }
}

/// Settings of the browser front end's development server. Only carried, never used here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevServer {
    pub port: u16,
    pub host: bool,
    pub open: bool,
    pub root: String,
    pub out_dir: String,
    pub empty_out_dir: bool,
    pub sourcemap: bool,
}

impl Default for DevServer {
    fn default() -> Self {
        DevServer {
            port: 5173,
            host: true,
            open: true,
            root: "src".to_string(),
            out_dir: "dist".to_string(),
            empty_out_dir: true,
            sourcemap: true,
        }
    }
}

impl ProcessorConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: ProcessorConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|err| MathError::Config(err.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        let decimal = separator("decimal", &self.standards.decimal)?;
        let thousands = separator("thousands", &self.standards.thousands)?;
        if decimal == thousands {
            return Err(MathError::Config(format!(
                "decimal and thousands separators are both `{decimal}`"
            )));
        }
        let engine = &self.engine;
        if !(engine.scan_min < engine.scan_max) {
            return Err(MathError::Config(format!(
                "engine scan range [{}, {}] is empty",
                engine.scan_min, engine.scan_max
            )));
        }
        if engine.scan_samples < 2 {
            return Err(MathError::Config("engine.scan_samples must be at least 2".to_string()));
        }
        if !(engine.zero_tolerance > 0.0) {
            return Err(MathError::Config("engine.zero_tolerance must be positive".to_string()));
        }
        Ok(())
    }
}

fn separator(name: &str, value: &str) -> Result<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if !c.is_alphanumeric() && !c.is_whitespace() => Ok(c),
        _ => Err(MathError::Config(format!(
            "{name} separator must be a single punctuation character, got `{value}`"
        ))),
    }
}

/// Operator glyphs and function names offered per family.
pub const SUPPORTED_OPERATIONS: &[(&str, &[&str])] = &[
    ("algebraic", &["+", "-", "·", "÷", "^", "√"]),
    ("trigonometric", &["sin", "cos", "tan", "asin", "acos", "atan"]),
    ("logarithmic", &["log", "ln"]),
    ("matrix", &["det", "inv", "transpose"]),
    ("statistical", &["mean", "median", "std", "variance"]),
];

/// Display glyphs for notations the engine does not compute with.
pub const COMPLEX_NOTATIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "matrix",
        &[
            ("determinant", "det"),
            ("trace", "tr"),
            ("transpose", "T"),
            ("inverse", "-1"),
            ("conjugate", "*"),
        ],
    ),
    (
        "vector",
        &[("dot", "·"), ("cross", "×"), ("norm", "||"), ("angle", "∠")],
    ),
    (
        "set",
        &[
            ("element", "∈"),
            ("subset", "⊂"),
            ("proper_subset", "⊊"),
            ("superset", "⊃"),
            ("proper_superset", "⊋"),
            ("union", "∪"),
            ("intersection", "∩"),
            ("complement", "∁"),
        ],
    ),
    (
        "logic",
        &[
            ("forall", "∀"),
            ("exists", "∃"),
            ("not_exists", "∄"),
            ("implies", "⇒"),
            ("iff", "⇔"),
            ("and", "∧"),
            ("or", "∨"),
            ("not", "¬"),
        ],
    ),
];

/// Named special functions by group, as exposed through `special_function`.
pub const SPECIAL_FUNCTIONS: &[(&str, &[(&str, Function)])] = &[
    (
        "bessel",
        &[
            ("J", Function::BesselJ),
            ("Y", Function::BesselY),
            ("I", Function::BesselI),
            ("K", Function::BesselK),
        ],
    ),
    (
        "special",
        &[
            ("gamma", Function::Gamma),
            ("erf", Function::Erf),
            ("erfc", Function::Erfc),
            ("zeta", Function::Zeta),
            ("beta", Function::Beta),
            ("factorial", Function::Factorial),
            ("binomial", Function::Binomial),
        ],
    ),
    (
        "hyperbolic",
        &[
            ("sinh", Function::Sinh),
            ("cosh", Function::Cosh),
            ("tanh", Function::Tanh),
            ("coth", Function::Coth),
            ("sech", Function::Sech),
            ("csch", Function::Csch),
        ],
    ),
    (
        "inverse_trig",
        &[
            ("asin", Function::Asin),
            ("acos", Function::Acos),
            ("atan", Function::Atan),
            ("acot", Function::Acot),
            ("asec", Function::Asec),
            ("acsc", Function::Acsc),
        ],
    ),
];

pub fn special_function(group: &str, name: &str) -> Option<Function> {
    let group = if group == "inverseTrig" { "inverse_trig" } else { group };
    SPECIAL_FUNCTIONS
        .iter()
        .find(|(g, _)| *g == group)?
        .1
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, function)| *function)
}

pub fn supported_operations(family: &str) -> Option<&'static [&'static str]> {
    SUPPORTED_OPERATIONS
        .iter()
        .find(|(name, _)| *name == family)
        .map(|(_, ops)| *ops)
}

pub fn notation_glyph(family: &str, name: &str) -> Option<&'static str> {
    COMPLEX_NOTATIONS
        .iter()
        .find(|(f, _)| *f == family)?
        .1
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, glyph)| *glyph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = ProcessorConfig::from_toml_str("").unwrap();
        assert_eq!(config, ProcessorConfig::default());
    }

    #[test]
    fn rejects_equal_separators() {
        let err = ProcessorConfig::from_toml_str("[standards]\ndecimal = \".\"\n").unwrap_err();
        assert!(matches!(err, MathError::Config(_)));
    }
}
