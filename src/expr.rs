//! Expression tree definitions and helpers.
//!
//! An [`Expr`] is a shared handle to an immutable-looking node. Cloning a handle
//! shares the node; every mutation goes through copy-on-write, so a node is only
//! ever edited in place while its handle is the sole owner.

use std::fmt;
use std::rc::Rc;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use crate::operands::Operands;

pub type Rational = BigRational;

/// Node tag. Declaration order is the kind priority the comparator falls back on.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Kind {
    Integer,
    Symbol,
    FunctionCall,
    Factorial,
    Power,
    Product,
    Sum,
    Subtraction,
    SquareRoot,
    Infinity,
    NegativeInfinity,
    Undefined,
    Fail,
    Fraction,
    Division,
}

impl Kind {
    pub fn is_constant(self) -> bool {
        matches!(self, Kind::Integer | Kind::Fraction)
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Kind::Integer
                | Kind::Fraction
                | Kind::Symbol
                | Kind::Infinity
                | Kind::NegativeInfinity
                | Kind::Undefined
                | Kind::Fail
        )
    }

    /// Kinds whose like terms combine inside a sum.
    pub fn is_summable(self) -> bool {
        matches!(
            self,
            Kind::Symbol | Kind::Power | Kind::Product | Kind::FunctionCall | Kind::Factorial
        )
    }

    /// Kinds whose like bases combine inside a product.
    pub fn is_multiplicable(self) -> bool {
        matches!(
            self,
            Kind::Symbol | Kind::Power | Kind::Sum | Kind::FunctionCall | Kind::Factorial
        )
    }

    /// Kinds whose operand order carries meaning and is never sorted.
    pub fn is_ordered(self) -> bool {
        !matches!(self, Kind::Sum | Kind::Product)
    }

    pub fn is_failure(self) -> bool {
        matches!(self, Kind::Undefined | Kind::Fail)
    }

    pub(crate) fn priority(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Kind::Integer => "integer",
            Kind::Symbol => "symbol",
            Kind::FunctionCall => "funcall",
            Kind::Factorial => "fact",
            Kind::Power => "pow",
            Kind::Product => "mul",
            Kind::Sum => "add",
            Kind::Subtraction => "sub",
            Kind::SquareRoot => "sqrt",
            Kind::Infinity => "infinity",
            Kind::NegativeInfinity => "negative infinity",
            Kind::Undefined => "undefined",
            Kind::Fail => "fail",
            Kind::Fraction => "fraction",
            Kind::Division => "div",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Payload {
    Empty,
    Integer(BigInt),
    Name(String),
}

#[derive(Clone, Debug)]
struct Node {
    kind: Kind,
    payload: Payload,
    operands: Operands,
}

impl Drop for Node {
    // Unlinks children through a work stack so long chains do not recurse.
    fn drop(&mut self) {
        let mut pending = self.operands.take_all();
        while let Some(expr) = pending.pop() {
            if let Ok(mut node) = Rc::try_unwrap(expr.0) {
                pending.extend(node.operands.take_all());
            }
        }
    }
}

/// Shared handle to an expression node.
#[derive(Clone)]
pub struct Expr(Rc<Node>);

impl Expr {
    fn from_parts(kind: Kind, payload: Payload, operands: Operands) -> Self {
        Expr(Rc::new(Node {
            kind,
            payload,
            operands,
        }))
    }

    fn leaf(kind: Kind) -> Self {
        Expr::from_parts(kind, Payload::Empty, Operands::with_capacity(0))
    }

    pub fn integer(value: impl Into<BigInt>) -> Self {
        Expr::from_parts(
            Kind::Integer,
            Payload::Integer(value.into()),
            Operands::with_capacity(0),
        )
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Expr::from_parts(
            Kind::Symbol,
            Payload::Name(name.into()),
            Operands::with_capacity(0),
        )
    }

    /// A numerator/denominator pair, stored as given. [`crate::reduce`] brings it
    /// to lowest terms.
    pub fn fraction(num: impl Into<BigInt>, den: impl Into<BigInt>) -> Self {
        Expr::compound(
            Kind::Fraction,
            vec![Expr::integer(num), Expr::integer(den)],
        )
    }

    /// Build an operator node that takes ownership of `children`.
    ///
    /// Panics when `kind` carries a payload (use [`Expr::integer`],
    /// [`Expr::symbol`] or [`Expr::call`]) or when the arity does not fit the kind.
    pub fn compound(kind: Kind, children: Vec<Expr>) -> Self {
        let arity = children.len();
        match kind {
            Kind::Sum | Kind::Product | Kind::Subtraction => {}
            Kind::Power | Kind::Division => {
                assert!(arity == 2, "{} takes two operands, got {arity}", kind.label())
            }
            Kind::SquareRoot | Kind::Factorial => {
                assert!(arity == 1, "{} takes one operand, got {arity}", kind.label())
            }
            Kind::Fraction => assert!(
                arity == 2 && children.iter().all(|c| c.kind() == Kind::Integer),
                "fraction takes an integer numerator and denominator"
            ),
            Kind::Integer | Kind::Symbol | Kind::FunctionCall => {
                panic!("{} nodes need a payload constructor", kind.label())
            }
            Kind::Infinity | Kind::NegativeInfinity | Kind::Undefined | Kind::Fail => {
                assert!(arity == 0, "{} takes no operands", kind.label());
                return Expr::leaf(kind);
            }
        }
        Expr::from_parts(kind, Payload::Empty, Operands::from_vec(children))
    }

    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::from_parts(
            Kind::FunctionCall,
            Payload::Name(name.into()),
            Operands::from_vec(args),
        )
    }

    pub fn undefined() -> Self {
        Expr::leaf(Kind::Undefined)
    }

    pub fn fail() -> Self {
        Expr::leaf(Kind::Fail)
    }

    pub fn infinity() -> Self {
        Expr::leaf(Kind::Infinity)
    }

    pub fn negative_infinity() -> Self {
        Expr::leaf(Kind::NegativeInfinity)
    }

    pub fn sum(terms: Vec<Expr>) -> Self {
        Expr::compound(Kind::Sum, terms)
    }

    pub fn product(factors: Vec<Expr>) -> Self {
        Expr::compound(Kind::Product, factors)
    }

    pub fn subtraction(terms: Vec<Expr>) -> Self {
        Expr::compound(Kind::Subtraction, terms)
    }

    pub fn power(base: Expr, exp: Expr) -> Self {
        Expr::compound(Kind::Power, vec![base, exp])
    }

    pub fn division(num: Expr, den: Expr) -> Self {
        Expr::compound(Kind::Division, vec![num, den])
    }

    pub fn sqrt(radicand: Expr) -> Self {
        Expr::compound(Kind::SquareRoot, vec![radicand])
    }

    pub fn factorial(arg: Expr) -> Self {
        Expr::compound(Kind::Factorial, vec![arg])
    }

    /// `-1 * self`, unreduced.
    pub fn negate(self) -> Self {
        Expr::product(vec![Expr::integer(-1), self])
    }

    pub fn from_rational(value: &Rational) -> Self {
        if value.is_integer() {
            Expr::integer(value.to_integer())
        } else {
            Expr::fraction(value.numer().clone(), value.denom().clone())
        }
    }

    pub fn kind(&self) -> Kind {
        self.0.kind
    }

    pub fn is(&self, kind: Kind) -> bool {
        self.0.kind == kind
    }

    pub fn size(&self) -> usize {
        self.0.operands.len()
    }

    pub fn operand(&self, idx: usize) -> &Expr {
        self.0.operands.get(idx)
    }

    pub fn operands(&self) -> &[Expr] {
        self.0.operands.as_slice()
    }

    /// Integer payload. Panics for any other kind.
    pub fn value(&self) -> &BigInt {
        match &self.0.payload {
            Payload::Integer(v) => v,
            _ => panic!("value() called on a {} node", self.kind().label()),
        }
    }

    /// Symbol or function name. Panics for any other kind.
    pub fn identifier(&self) -> &str {
        match &self.0.payload {
            Payload::Name(name) => name,
            _ => panic!("identifier() called on a {} node", self.kind().label()),
        }
    }

    pub fn as_integer(&self) -> Option<&BigInt> {
        match &self.0.payload {
            Payload::Integer(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match (&self.0.payload, self.kind()) {
            (Payload::Name(name), Kind::Symbol) => Some(name),
            _ => None,
        }
    }

    /// Numeric value of an Integer or Fraction node.
    pub fn as_rational(&self) -> Option<Rational> {
        match self.kind() {
            Kind::Integer => Some(Rational::from_integer(self.value().clone())),
            Kind::Fraction => {
                let den = self.operand(1).value();
                if den.is_zero() {
                    return None;
                }
                Some(Rational::new(self.operand(0).value().clone(), den.clone()))
            }
            _ => None,
        }
    }

    pub fn is_constant(&self) -> bool {
        self.kind().is_constant()
    }

    pub fn is_terminal(&self) -> bool {
        self.kind().is_terminal()
    }

    pub fn is_failure(&self) -> bool {
        self.kind().is_failure()
    }

    pub fn is_zero(&self) -> bool {
        matches!(&self.0.payload, Payload::Integer(v) if v.is_zero())
    }

    pub fn is_one(&self) -> bool {
        matches!(&self.0.payload, Payload::Integer(v) if v.is_one())
    }

    pub fn is_negative_constant(&self) -> bool {
        match self.kind() {
            Kind::Integer => self.value().is_negative(),
            Kind::Fraction => {
                self.operand(0).value().is_negative() != self.operand(1).value().is_negative()
            }
            _ => false,
        }
    }

    /// Number of handles currently sharing this node.
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    pub fn ptr_eq(&self, other: &Expr) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn address(&self) -> *const () {
        Rc::as_ptr(&self.0) as *const ()
    }

    /// Return a handle that is the sole owner of its node: `self` when nobody
    /// else shares it, otherwise a copy whose children are shared with the
    /// original.
    pub fn into_exclusive(mut self) -> Self {
        Rc::make_mut(&mut self.0);
        self
    }

    pub(crate) fn operands_mut(&mut self) -> &mut Operands {
        &mut Rc::make_mut(&mut self.0).operands
    }

    /// Replace operand `idx`, returning the previous handle.
    pub(crate) fn set_operand(&mut self, idx: usize, value: Expr) -> Expr {
        self.operands_mut().replace(idx, value)
    }

    /// Change the kind of an operator node in place, keeping its operands.
    pub(crate) fn retag(&mut self, kind: Kind) {
        assert!(
            matches!(self.0.payload, Payload::Empty) && !kind.is_terminal(),
            "cannot retag {} as {}",
            self.kind().label(),
            kind.label()
        );
        Rc::make_mut(&mut self.0).kind = kind;
    }

    /// Apply `f` to every operand, keeping the node kind and payload.
    ///
    /// Operands that come back as the very same node are left in place, so an
    /// untouched shared node stays shared.
    pub(crate) fn map_operands(mut self, mut f: impl FnMut(Expr) -> Expr) -> Expr {
        for idx in 0..self.size() {
            let child = self.operand(idx).clone();
            let mapped = f(child);
            if !mapped.ptr_eq(self.operand(idx)) {
                self.set_operand(idx, mapped);
            }
        }
        self
    }

    /// Consume the handle and return its operands, moving them out when the node
    /// is not shared.
    pub(crate) fn into_operands(self) -> Vec<Expr> {
        match Rc::try_unwrap(self.0) {
            Ok(mut node) => node.operands.take_all(),
            Err(shared) => shared.operands.as_slice().to_vec(),
        }
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        self.kind() == other.kind()
            && self.0.payload == other.0.payload
            && self.operands() == other.operands()
    }
}

impl Eq for Expr {}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.payload {
            Payload::Integer(v) => write!(f, "Integer({v})"),
            Payload::Name(name) if self.kind() == Kind::Symbol => write!(f, "Symbol({name:?})"),
            Payload::Name(name) => {
                write!(f, "FunctionCall({name:?}, ")?;
                f.debug_list().entries(self.operands()).finish()?;
                write!(f, ")")
            }
            Payload::Empty if self.operands().is_empty() => write!(f, "{:?}", self.kind()),
            Payload::Empty => {
                write!(f, "{:?}", self.kind())?;
                f.debug_list().entries(self.operands()).finish()
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::format::pretty(self))
    }
}

pub fn zero() -> Expr {
    Expr::integer(0)
}

pub fn one() -> Expr {
    Expr::integer(1)
}

pub fn int(value: i64) -> Expr {
    Expr::integer(value)
}

pub fn sym(name: &str) -> Expr {
    Expr::symbol(name)
}

pub fn frac(num: i64, den: i64) -> Expr {
    Expr::fraction(num, den)
}

pub fn add(terms: Vec<Expr>) -> Expr {
    Expr::sum(terms)
}

pub fn sub(terms: Vec<Expr>) -> Expr {
    Expr::subtraction(terms)
}

pub fn mul(factors: Vec<Expr>) -> Expr {
    Expr::product(factors)
}

pub fn div(num: Expr, den: Expr) -> Expr {
    Expr::division(num, den)
}

pub fn pow(base: Expr, exp: Expr) -> Expr {
    Expr::power(base, exp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclusive_handle_is_returned_unchanged() {
        let e = add(vec![sym("x"), int(1)]);
        let before = e.address();
        let e = e.into_exclusive();
        assert_eq!(e.address(), before);
        assert_eq!(e.ref_count(), 1);
    }

    #[test]
    fn shared_handle_is_copied_before_mutation() {
        let x = sym("x");
        let original = add(vec![x.clone(), int(1)]);
        let alias = original.clone();
        assert_eq!(original.ref_count(), 2);

        let copy = alias.into_exclusive();
        assert!(!copy.ptr_eq(&original));
        assert_eq!(original.ref_count(), 1);
        assert_eq!(copy.ref_count(), 1);
        // children are shared, not duplicated
        assert!(copy.operand(0).ptr_eq(&x));
        assert_eq!(x.ref_count(), 3);
        assert_eq!(copy, original);
    }

    #[test]
    fn mutation_through_a_shared_handle_leaves_other_owners_alone() {
        let original = mul(vec![int(2), sym("x")]);
        let mut edited = original.clone();
        edited.set_operand(1, sym("y"));
        edited.retag(Kind::Sum);
        assert_eq!(original, mul(vec![int(2), sym("x")]));
        assert_eq!(edited, add(vec![int(2), sym("y")]));
    }

    #[test]
    fn dropping_releases_children() {
        let x = sym("x");
        let tree = pow(add(vec![x.clone(), x.clone()]), int(2));
        assert_eq!(x.ref_count(), 3);
        drop(tree);
        assert_eq!(x.ref_count(), 1);
    }

    #[test]
    fn dropping_a_deep_chain_does_not_overflow() {
        let mut e = sym("x");
        for _ in 0..200_000 {
            e = add(vec![e]);
        }
        drop(e);
    }

    #[test]
    fn accessors_report_payloads() {
        assert_eq!(int(7).value(), &BigInt::from(7));
        assert_eq!(sym("abc").identifier(), "abc");
        assert_eq!(Expr::call("f", vec![sym("x")]).identifier(), "f");
        assert_eq!(frac(4, 8).size(), 2);
        assert_eq!(frac(4, 8).as_rational(), Some(Rational::new(1.into(), 2.into())));
    }

    #[test]
    #[should_panic(expected = "value() called on a symbol node")]
    fn value_of_a_symbol_is_a_contract_violation() {
        sym("x").value();
    }

    #[test]
    #[should_panic(expected = "pow takes two operands")]
    fn power_arity_is_checked() {
        Expr::compound(Kind::Power, vec![sym("x")]);
    }

    #[test]
    fn into_operands_moves_out_of_unique_nodes() {
        let x = sym("x");
        let e = add(vec![x.clone(), int(3)]);
        let ops = e.into_operands();
        assert_eq!(ops.len(), 2);
        assert_eq!(x.ref_count(), 2);
    }
}
