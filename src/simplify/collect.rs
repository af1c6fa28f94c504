use std::cmp::Reverse;
use std::collections::BTreeMap;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::expr::{self, Expr, Function, Rational};
use crate::format::pretty;
use crate::polynomial::Poly;

use super::rules::{fold_call, rational_pow, rational_root};

/// Products of sums are only distributed while the result stays below this many terms.
pub(crate) const TERM_LIMIT: usize = 64;
/// Largest integer power of a sum that expansion multiplies out.
const EXPAND_POWER_LIMIT: i64 = 8;

/// Atom name to exponent. Negative exponents sit in the denominator.
type Monomial = BTreeMap<String, i64>;

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Terms {
    terms: BTreeMap<Monomial, Rational>,
}

impl Terms {
    fn constant(c: Rational) -> Self {
        let mut terms = Terms::default();
        terms.add_term(Monomial::new(), c);
        terms
    }

    fn single(key: String, exp: i64, coeff: Rational) -> Self {
        let mut terms = Terms::default();
        terms.add_term(Monomial::from([(key, exp)]), coeff);
        terms
    }

    fn add_term(&mut self, monomial: Monomial, coeff: Rational) {
        if coeff.is_zero() {
            return;
        }
        let slot = self.terms.entry(monomial).or_insert_with(Rational::zero);
        *slot += coeff;
        self.terms.retain(|_, c| !c.is_zero());
    }

    fn len(&self) -> usize {
        self.terms.len()
    }

    fn add(mut self, other: Terms) -> Terms {
        for (monomial, coeff) in other.terms {
            self.add_term(monomial, coeff);
        }
        self
    }

    fn negate(self) -> Terms {
        self.scale(&-Rational::one())
    }

    fn scale(&self, k: &Rational) -> Terms {
        let mut out = Terms::default();
        for (monomial, coeff) in &self.terms {
            out.add_term(monomial.clone(), coeff * k);
        }
        out
    }

    fn mul(&self, other: &Terms) -> Terms {
        let mut out = Terms::default();
        for (m_a, c_a) in &self.terms {
            for (m_b, c_b) in &other.terms {
                let mut monomial = m_a.clone();
                for (key, exp) in m_b {
                    *monomial.entry(key.clone()).or_insert(0) += exp;
                }
                monomial.retain(|_, e| *e != 0);
                out.add_term(monomial, c_a * c_b);
            }
        }
        out
    }

    /// The rational value when no atoms remain.
    fn as_constant(&self) -> Option<Rational> {
        match self.terms.len() {
            0 => Some(Rational::zero()),
            1 => self
                .terms
                .get(&Monomial::new())
                .cloned(),
            _ => None,
        }
    }

    /// Raise a single term to an integer power.
    fn pow_single(&self, n: i64) -> Option<Terms> {
        let (monomial, coeff) = self.terms.iter().next()?;
        let coeff = rational_pow(coeff, n)?;
        let monomial = monomial.iter().map(|(k, e)| (k.clone(), e * n)).collect();
        let mut out = Terms::default();
        out.add_term(monomial, coeff);
        Some(out)
    }

    fn ordered(&self) -> Vec<(&Monomial, &Rational)> {
        let mut entries: Vec<_> = self.terms.iter().collect();
        entries.sort_by_key(|(m, _)| {
            let degree: i64 = m.values().sum();
            (m.is_empty(), Reverse(degree), (*m).clone())
        });
        entries
    }
}

/// Collects an expression into a sum of monomials over opaque atoms, e.g. variables,
/// function calls and sums that were kept unexpanded.
pub(crate) struct Collector {
    atoms: BTreeMap<String, Expr>,
    expand: bool,
}

impl Collector {
    pub(crate) fn new(expand: bool) -> Self {
        Collector {
            atoms: BTreeMap::new(),
            expand,
        }
    }

    pub(crate) fn reduce(expr: &Expr, expand: bool) -> Expr {
        let mut collector = Collector::new(expand);
        let mut terms = collector.collect(expr);
        collector.pythagorean(&mut terms);
        collector.render(&terms)
    }

    fn atom(&mut self, expr: Expr) -> Terms {
        let key = pretty(&expr);
        self.atoms.entry(key.clone()).or_insert(expr);
        Terms::single(key, 1, Rational::one())
    }

    fn simplified(&mut self, expr: &Expr) -> Expr {
        let terms = self.collect(expr);
        self.render(&terms)
    }

    pub(crate) fn collect(&mut self, expr: &Expr) -> Terms {
        match expr {
            Expr::Constant(c) => Terms::constant(c.clone()),
            Expr::Variable(_) | Expr::Float(_) => self.atom(expr.clone()),
            Expr::Add(a, b) => {
                let left = self.collect(a);
                left.add(self.collect(b))
            }
            Expr::Sub(a, b) => {
                let left = self.collect(a);
                left.add(self.collect(b).negate())
            }
            Expr::Neg(a) => self.collect(a).negate(),
            Expr::Mul(a, b) => {
                let left = self.collect(a);
                let right = self.collect(b);
                self.product(left, right)
            }
            Expr::Div(a, b) => {
                let num = self.collect(a);
                let den = self.collect(b);
                self.quotient(num, den)
            }
            Expr::Pow(base, exp) => self.power(base, exp),
            Expr::Factorial(a) => {
                let inner = self.simplified(a);
                match fold_call(Function::Factorial, vec![inner.clone()]) {
                    Expr::Call(..) => self.atom(Expr::Factorial(inner.boxed())),
                    folded => self.collect(&folded),
                }
            }
            Expr::Call(function, args) => {
                let args = args.iter().map(|arg| self.simplified(arg)).collect();
                match fold_call(*function, args) {
                    call @ Expr::Call(..) => self.atom(call),
                    folded => self.collect(&folded),
                }
            }
            Expr::Matrix(rows) => {
                let rows = rows
                    .iter()
                    .map(|row| row.iter().map(|cell| self.simplified(cell)).collect())
                    .collect();
                self.atom(Expr::Matrix(rows))
            }
            Expr::Equation(..) | Expr::Inequality(..) => self.atom(expr.clone()),
        }
    }

    fn product(&mut self, left: Terms, right: Terms) -> Terms {
        if left.len() <= 1
            || right.len() <= 1
            || (self.expand && left.len() * right.len() <= TERM_LIMIT)
        {
            return left.mul(&right);
        }
        let left = self.atomize(left);
        let right = self.atomize(right);
        left.mul(&right)
    }

    fn quotient(&mut self, num: Terms, den: Terms) -> Terms {
        if let Some(c) = den.as_constant() {
            if c.is_zero() {
                let num = self.render(&num);
                return self.atom(expr::div(num, expr::zero()));
            }
            return num.scale(&c.recip());
        }
        if den.len() == 1 {
            if let Some(inverse) = den.pow_single(-1) {
                return num.mul(&inverse);
            }
        }
        if let Some(var) = self.common_variable(&[&num, &den]) {
            if let (Some(p_num), Some(p_den)) = (self.to_poly(&num, &var), self.to_poly(&den, &var)) {
                let g = Poly::gcd(&p_num, &p_den);
                if !g.is_constant() {
                    let q_num = p_num.div_exact(&g).unwrap_or(p_num);
                    let q_den = p_den.div_exact(&g).unwrap_or(p_den);
                    let num = self.collect(&q_num.to_expr(&var));
                    if q_den.is_constant() {
                        return num.scale(&q_den.coeff(0).recip());
                    }
                    let den = self.collect(&q_den.to_expr(&var));
                    let den = self.atomize(den);
                    return match den.pow_single(-1) {
                        Some(inverse) => num.mul(&inverse),
                        None => num,
                    };
                }
            }
        }
        let den = self.atomize(den);
        match den.pow_single(-1) {
            Some(inverse) => num.mul(&inverse),
            None => num,
        }
    }

    fn power(&mut self, base: &Expr, exp: &Expr) -> Terms {
        let exponent = self.simplified(exp);
        let base_terms = self.collect(base);

        if let Some(n) = exponent.as_rational() {
            if n.is_integer() {
                if let Some(n) = n.to_integer().to_i64() {
                    if let Some(terms) = self.integer_power(&base_terms, n) {
                        return terms;
                    }
                }
            } else if let Some(root) = base_terms
                .as_constant()
                .and_then(|c| rational_root(&c, n.denom()))
            {
                if let Some(value) = n.numer().to_i64().and_then(|p| rational_pow(&root, p)) {
                    return Terms::constant(value);
                }
            }
        }

        let base = self.render(&base_terms);
        self.atom(expr::pow(base, exponent))
    }

    fn integer_power(&mut self, base: &Terms, n: i64) -> Option<Terms> {
        if n == 0 {
            return Some(Terms::constant(Rational::one()));
        }
        if base.len() == 0 {
            return (n > 0).then(Terms::default);
        }
        if base.len() == 1 {
            return base.pow_single(n);
        }
        if self.expand && (2..=EXPAND_POWER_LIMIT).contains(&n) {
            let mut acc = base.clone();
            for _ in 1..n {
                acc = self.product(acc, base.clone());
            }
            return Some(acc);
        }
        self.atomize(base.clone()).pow_single(n)
    }

    /// Replace a sum by `content * atom(primitive sum)`.
    fn atomize(&mut self, terms: Terms) -> Terms {
        if terms.len() <= 1 {
            return terms;
        }
        let content = self.content(&terms);
        let primitive = terms.scale(&content.recip());
        let expr = self.render(&primitive);
        let key = pretty(&expr);
        self.atoms.entry(key.clone()).or_insert(expr);
        Terms::single(key, 1, content)
    }

    /// Rational gcd of the coefficients, signed so the leading term stays positive.
    fn content(&self, terms: &Terms) -> Rational {
        let (numer, denom) = terms.terms.values().fold(
            (BigInt::zero(), BigInt::one()),
            |(n, d), c| (n.gcd(c.numer()), d.lcm(c.denom())),
        );
        let content = Rational::new(numer, denom);
        match terms.ordered().first() {
            Some((_, lead)) if lead.is_negative() => -content,
            _ => content,
        }
    }

    fn common_variable(&self, sums: &[&Terms]) -> Option<String> {
        let mut found: Option<String> = None;
        for terms in sums {
            for monomial in terms.terms.keys() {
                for key in monomial.keys() {
                    if !matches!(self.atoms.get(key), Some(Expr::Variable(_))) {
                        return None;
                    }
                    match &found {
                        Some(existing) if existing != key => return None,
                        _ => found = Some(key.clone()),
                    }
                }
            }
        }
        found
    }

    fn to_poly(&self, terms: &Terms, var: &str) -> Option<Poly> {
        let mut poly = Poly::zero();
        for (monomial, coeff) in &terms.terms {
            let power = match monomial.get(var) {
                Some(e) => usize::try_from(*e).ok()?,
                None => 0,
            };
            poly = &poly + &Poly::monomial(coeff.clone(), power);
        }
        Some(poly)
    }

    /// Fold `c*sin(u)^2 + c*cos(u)^2` into `c`, also under a shared cofactor.
    fn pythagorean(&self, terms: &mut Terms) {
        'search: loop {
            for (monomial, coeff) in terms.terms.clone() {
                for (key, exp) in &monomial {
                    let Some(Expr::Call(Function::Sin, args)) = self.atoms.get(key) else {
                        continue;
                    };
                    if *exp < 2 {
                        continue;
                    }
                    let cos_key = pretty(&Expr::Call(Function::Cos, args.clone()));
                    let mut rest = monomial.clone();
                    bump(&mut rest, key, -2);
                    let mut partner = rest.clone();
                    bump(&mut partner, &cos_key, 2);
                    if terms.terms.get(&partner) == Some(&coeff) {
                        terms.terms.remove(&monomial);
                        terms.terms.remove(&partner);
                        terms.add_term(rest, coeff);
                        continue 'search;
                    }
                }
            }
            break;
        }
    }

    pub(crate) fn render(&self, terms: &Terms) -> Expr {
        let mut result: Option<Expr> = None;
        for (monomial, coeff) in terms.ordered() {
            let term = self.render_term(monomial, &coeff.abs());
            result = Some(match result {
                None if coeff.is_negative() => expr::neg(term),
                None => term,
                Some(acc) if coeff.is_negative() => expr::sub(acc, term),
                Some(acc) => expr::add(acc, term),
            });
        }
        result.unwrap_or_else(expr::zero)
    }

    fn render_term(&self, monomial: &Monomial, magnitude: &Rational) -> Expr {
        if monomial.is_empty() {
            return Expr::Constant(magnitude.clone());
        }
        let mut numer = Vec::new();
        let mut denom = Vec::new();
        if !magnitude.numer().is_one() || monomial.values().all(|e| *e < 0) {
            numer.push(Expr::Constant(Rational::from_integer(magnitude.numer().clone())));
        }
        if !magnitude.denom().is_one() {
            denom.push(Expr::Constant(Rational::from_integer(magnitude.denom().clone())));
        }
        for (key, exp) in monomial {
            let Some(atom) = self.atoms.get(key) else {
                continue;
            };
            let factor = |e: i64| {
                if e == 1 {
                    atom.clone()
                } else {
                    expr::pow(atom.clone(), Expr::integer(e))
                }
            };
            if *exp > 0 {
                numer.push(factor(*exp));
            } else {
                denom.push(factor(-exp));
            }
        }

        // A terminating coefficient like 0.5 reads better inline than as a denominator.
        if monomial.values().all(|e| *e > 0) && denom.len() == 1 && is_decimal(magnitude) {
            numer.retain(|e| !matches!(e, Expr::Constant(_)));
            numer.insert(0, Expr::Constant(magnitude.clone()));
            denom.clear();
        }

        let numer = product(numer);
        if denom.is_empty() {
            numer
        } else {
            expr::div(numer, product(denom))
        }
    }
}

fn is_decimal(r: &Rational) -> bool {
    let mut d = r.denom().clone();
    for p in [2u32, 5] {
        let p = BigInt::from(p);
        while (&d % &p).is_zero() {
            d /= &p;
        }
    }
    d.is_one() && r.denom().to_u64().is_some_and(|d| d <= 1000)
}

fn bump(monomial: &mut Monomial, key: &str, delta: i64) {
    let exp = monomial.entry(key.to_string()).or_insert(0);
    *exp += delta;
    if *exp == 0 {
        monomial.remove(key);
    }
}

fn product(factors: Vec<Expr>) -> Expr {
    factors
        .into_iter()
        .reduce(expr::mul)
        .unwrap_or_else(expr::one)
}
