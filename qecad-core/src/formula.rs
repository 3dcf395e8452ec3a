//! Prenex formulas over polynomial sign conditions.
//!
//! A [`Formula`] is a closed tagged union of atoms, conjunctions,
//! disjunctions and the two quantifiers. Variables are indices into a
//! [`VariableTable`], which also owns the names used for display; there is
//! no process-global name table.

use crate::cad::Sign;
use qecad_math::{Polynomial, Var};
use rustc_hash::FxHashMap;
use std::fmt;

/// Bidirectional map between variable names and indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableTable {
    names: Vec<String>,
    index: FxHashMap<String, Var>,
}

impl VariableTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// A table holding `names` in order.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        let mut table = Self::new();
        for n in names {
            table.add(n.as_ref());
        }
        table
    }

    /// Index of `name`, adding it if absent.
    pub fn add(&mut self, name: &str) -> Var {
        if let Some(&v) = self.index.get(name) {
            return v;
        }
        let v = self.names.len() as Var;
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), v);
        v
    }

    /// Index of `name`.
    pub fn get(&self, name: &str) -> Option<Var> {
        self.index.get(name).copied()
    }

    /// Name of `var`.
    pub fn name(&self, var: Var) -> Option<&str> {
        self.names.get(var as usize).map(String::as_str)
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Whether `var` is defined.
    pub fn contains(&self, var: Var) -> bool {
        (var as usize) < self.names.len()
    }

    /// Names in index order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The polynomial `name`.
    pub fn var_poly(&self, name: &str) -> Option<Polynomial> {
        self.get(name).map(Polynomial::from_var)
    }

    /// Print `p` with variable names instead of indices.
    pub fn fmt_poly(&self, p: &Polynomial) -> String {
        if p.is_zero() {
            return "0".to_string();
        }
        let mut out = String::new();
        for (i, t) in p.terms().iter().enumerate() {
            let negative = t.coeff < num_rational::BigRational::from_integer(0.into());
            let c = if negative { -t.coeff.clone() } else { t.coeff.clone() };
            if i == 0 {
                if negative {
                    out.push('-');
                }
            } else {
                out.push_str(if negative { " - " } else { " + " });
            }
            let mono: Vec<String> = t
                .monomial
                .vars()
                .iter()
                .map(|vp| {
                    let name = self
                        .name(vp.var)
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("x{}", vp.var));
                    if vp.power == 1 {
                        name
                    } else {
                        format!("{}^{}", name, vp.power)
                    }
                })
                .collect();
            let one = num_rational::BigRational::from_integer(1.into());
            if mono.is_empty() {
                out.push_str(&c.to_string());
            } else if c == one {
                out.push_str(&mono.join("*"));
            } else {
                out.push_str(&format!("{}*{}", c, mono.join("*")));
            }
        }
        out
    }

    /// Print a formula with variable names.
    pub fn fmt_formula(&self, f: &Formula) -> String {
        match f {
            Formula::Atom { poly, op } => format!("{} {} 0", self.fmt_poly(poly), op),
            Formula::And(args) => self.fmt_args(args, " /\\ "),
            Formula::Or(args) => self.fmt_args(args, " \\/ "),
            Formula::Exists(vars, body) => {
                format!("ex {}. {}", self.fmt_vars(vars), self.fmt_formula(body))
            }
            Formula::ForAll(vars, body) => {
                format!("all {}. {}", self.fmt_vars(vars), self.fmt_formula(body))
            }
        }
    }

    fn fmt_args(&self, args: &[Formula], sep: &str) -> String {
        let parts: Vec<String> = args.iter().map(|a| self.fmt_formula(a)).collect();
        format!("({})", parts.join(sep))
    }

    fn fmt_vars(&self, vars: &[Var]) -> String {
        vars.iter()
            .map(|&v| {
                self.name(v)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("x{}", v))
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Sign condition of an atom `p op 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelOp {
    /// `p < 0`
    Lt,
    /// `p <= 0`
    Le,
    /// `p > 0`
    Gt,
    /// `p >= 0`
    Ge,
    /// `p = 0`
    Eq,
    /// `p != 0`
    Ne,
}

impl RelOp {
    /// Whether a value of sign `s` satisfies the condition.
    pub fn holds(self, s: Sign) -> bool {
        match self {
            RelOp::Lt => s == Sign::Negative,
            RelOp::Le => s != Sign::Positive,
            RelOp::Gt => s == Sign::Positive,
            RelOp::Ge => s != Sign::Negative,
            RelOp::Eq => s == Sign::Zero,
            RelOp::Ne => s != Sign::Zero,
        }
    }

    /// The condition satisfied exactly when `self` is not.
    pub fn negate(self) -> RelOp {
        match self {
            RelOp::Lt => RelOp::Ge,
            RelOp::Le => RelOp::Gt,
            RelOp::Gt => RelOp::Le,
            RelOp::Ge => RelOp::Lt,
            RelOp::Eq => RelOp::Ne,
            RelOp::Ne => RelOp::Eq,
        }
    }
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RelOp::Lt => "<",
            RelOp::Le => "<=",
            RelOp::Gt => ">",
            RelOp::Ge => ">=",
            RelOp::Eq => "=",
            RelOp::Ne => "!=",
        };
        write!(f, "{}", s)
    }
}

/// Quantifier of a variable block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantifier {
    /// Existential.
    Exists,
    /// Universal.
    ForAll,
}

impl Quantifier {
    /// The child truth value that decides the quantified cell on its own.
    pub fn target(self) -> bool {
        matches!(self, Quantifier::Exists)
    }
}

/// A first-order formula over polynomial sign conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formula {
    /// `poly op 0`.
    Atom {
        /// Left-hand side.
        poly: Polynomial,
        /// Sign condition.
        op: RelOp,
    },
    /// Conjunction; empty means true.
    And(Vec<Formula>),
    /// Disjunction; empty means false.
    Or(Vec<Formula>),
    /// Universal quantification of a block.
    ForAll(Vec<Var>, Box<Formula>),
    /// Existential quantification of a block.
    Exists(Vec<Var>, Box<Formula>),
}

impl Formula {
    /// `poly op 0`.
    pub fn atom(poly: Polynomial, op: RelOp) -> Self {
        Formula::Atom { poly, op }
    }

    /// `lhs op rhs`, normalised to `lhs - rhs op 0`.
    pub fn compare(lhs: &Polynomial, op: RelOp, rhs: &Polynomial) -> Self {
        Formula::Atom {
            poly: lhs - rhs,
            op,
        }
    }

    /// Conjunction.
    pub fn and(args: Vec<Formula>) -> Self {
        Formula::And(args)
    }

    /// Disjunction.
    pub fn or(args: Vec<Formula>) -> Self {
        Formula::Or(args)
    }

    /// `exists vars. body`
    pub fn exists(vars: Vec<Var>, body: Formula) -> Self {
        Formula::Exists(vars, Box::new(body))
    }

    /// `forall vars. body`
    pub fn forall(vars: Vec<Var>, body: Formula) -> Self {
        Formula::ForAll(vars, Box::new(body))
    }

    /// Whether no quantifier occurs.
    pub fn is_quantifier_free(&self) -> bool {
        match self {
            Formula::Atom { .. } => true,
            Formula::And(args) | Formula::Or(args) => args.iter().all(Formula::is_quantifier_free),
            Formula::ForAll(..) | Formula::Exists(..) => false,
        }
    }

    /// Every variable occurring in an atom, sorted.
    pub fn atom_vars(&self) -> Vec<Var> {
        let mut out = Vec::new();
        self.for_each_atom(&mut |p, _| out.extend(p.vars()));
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Visit every atom.
    pub fn for_each_atom(&self, f: &mut impl FnMut(&Polynomial, RelOp)) {
        match self {
            Formula::Atom { poly, op } => f(poly, *op),
            Formula::And(args) | Formula::Or(args) => {
                for a in args {
                    a.for_each_atom(f);
                }
            }
            Formula::ForAll(_, body) | Formula::Exists(_, body) => body.for_each_atom(f),
        }
    }

    /// Rename every variable, in atoms and quantifier blocks.
    pub fn map_vars(&self, map: &impl Fn(Var) -> Var) -> Formula {
        match self {
            Formula::Atom { poly, op } => Formula::Atom {
                poly: poly.map_vars(map),
                op: *op,
            },
            Formula::And(args) => Formula::And(args.iter().map(|a| a.map_vars(map)).collect()),
            Formula::Or(args) => Formula::Or(args.iter().map(|a| a.map_vars(map)).collect()),
            Formula::ForAll(vars, body) => {
                Formula::ForAll(vars.iter().map(|&v| map(v)).collect(), Box::new(body.map_vars(map)))
            }
            Formula::Exists(vars, body) => {
                Formula::Exists(vars.iter().map(|&v| map(v)).collect(), Box::new(body.map_vars(map)))
            }
        }
    }

    /// Truth of a quantifier-free formula given a three-valued oracle for
    /// atoms. `None` means undetermined.
    pub fn eval_with(&self, atom: &mut impl FnMut(&Polynomial, RelOp) -> Option<bool>) -> Option<bool> {
        match self {
            Formula::Atom { poly, op } => atom(poly, *op),
            Formula::And(args) => {
                let mut all = true;
                for a in args {
                    match a.eval_with(atom) {
                        Some(false) => return Some(false),
                        Some(true) => {}
                        None => all = false,
                    }
                }
                all.then_some(true)
            }
            Formula::Or(args) => {
                let mut all = true;
                for a in args {
                    match a.eval_with(atom) {
                        Some(true) => return Some(true),
                        Some(false) => {}
                        None => all = false,
                    }
                }
                all.then_some(false)
            }
            Formula::ForAll(..) | Formula::Exists(..) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_table() {
        let mut t = VariableTable::from_names(&["x", "y"]);
        assert_eq!(t.get("y"), Some(1));
        assert_eq!(t.add("x"), 0);
        assert_eq!(t.add("z"), 2);
        assert_eq!(t.name(2), Some("z"));
        assert!(!t.contains(3));
    }

    #[test]
    fn test_fmt_poly() {
        let t = VariableTable::from_names(&["x", "y"]);
        // x^2 - 3*y + 1
        let p = Polynomial::from_coeffs_int(&[(1, &[(0, 2)]), (-3, &[(1, 1)]), (1, &[])]);
        let s = t.fmt_poly(&p);
        assert!(s.contains("x^2"));
        assert!(s.contains("3*y"));
        assert_eq!(t.fmt_poly(&Polynomial::zero()), "0");
    }

    #[test]
    fn test_relop_holds() {
        assert!(RelOp::Le.holds(Sign::Zero));
        assert!(!RelOp::Lt.holds(Sign::Zero));
        assert!(RelOp::Ne.holds(Sign::Negative));
        for op in [RelOp::Lt, RelOp::Le, RelOp::Gt, RelOp::Ge, RelOp::Eq, RelOp::Ne] {
            for s in [Sign::Negative, Sign::Zero, Sign::Positive] {
                assert_ne!(op.holds(s), op.negate().holds(s));
            }
        }
    }

    #[test]
    fn test_three_valued_eval() {
        let x = Polynomial::from_var(0);
        let f = Formula::and(vec![
            Formula::atom(x.clone(), RelOp::Gt),
            Formula::atom(x.clone(), RelOp::Lt),
        ]);
        let mut first_unknown = |_: &Polynomial, op: RelOp| (op == RelOp::Lt).then_some(false);
        assert_eq!(f.eval_with(&mut first_unknown), Some(false));
        let mut unknown = |_: &Polynomial, _: RelOp| None;
        assert_eq!(f.eval_with(&mut unknown), None);
        assert_eq!(Formula::Or(vec![]).eval_with(&mut unknown), Some(false));
    }

    #[test]
    fn test_quantifier_structure() {
        let x = Polynomial::from_var(0);
        let f = Formula::exists(vec![0], Formula::atom(x, RelOp::Eq));
        assert!(!f.is_quantifier_free());
        assert_eq!(f.atom_vars(), vec![0]);
        let g = f.map_vars(&|v| v + 1);
        assert_eq!(g.atom_vars(), vec![1]);
        assert!(Quantifier::Exists.target());
    }
}
