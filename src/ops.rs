//! Elementary operation builders. Each one evaluates the forward value and
//! the analytic local partials at the operands' current values and creates a
//! fully wired node, so no node is ever observable with an unbound input.

use crate::node::{Input, Node};

/// Additive bias keeping the logarithm of zero finite.
const LOG_BIAS: f64 = 1e-13;

fn unary(name: String, value: f64, x: &Node, partial: f64) -> Node {
    Node::op(
        name,
        value,
        vec![Input {
            term: x.clone(),
            partial,
        }],
    )
}

fn name_list(terms: &[Node]) -> String {
    terms
        .iter()
        .map(|term| term.name())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Node {
    pub fn exp(&self) -> Node {
        let z = self.value().exp();
        unary(format!("exp({})", self.name()), z, self, z)
    }

    pub fn sqrt(&self) -> Node {
        let z = self.value().sqrt();
        unary(format!("sqrt({})", self.name()), z, self, 0.5 / z)
    }

    /// Natural logarithm of the biased input, ln(x + 1e-13).
    pub fn ln(&self) -> Node {
        let biased = self.value() + LOG_BIAS;
        unary(format!("ln({})", self.name()), biased.ln(), self, 1. / biased)
    }

    /// Logarithm in the given base, with the same bias as [`Node::ln`].
    pub fn log(&self, base: f64) -> Node {
        let biased = self.value() + LOG_BIAS;
        unary(
            format!("log_{}({})", base, self.name()),
            biased.ln() / base.ln(),
            self,
            1. / (biased * base.ln()),
        )
    }

    pub fn sin(&self) -> Node {
        unary(
            format!("sin({})", self.name()),
            self.value().sin(),
            self,
            self.value().cos(),
        )
    }

    pub fn cos(&self) -> Node {
        unary(
            format!("cos({})", self.name()),
            self.value().cos(),
            self,
            -self.value().sin(),
        )
    }

    pub fn tan(&self) -> Node {
        let cos = self.value().cos();
        unary(
            format!("tan({})", self.name()),
            self.value().tan(),
            self,
            1. / (cos * cos),
        )
    }

    pub fn tanh(&self) -> Node {
        let z = self.value().tanh();
        unary(format!("tanh({})", self.name()), z, self, 1. - z * z)
    }

    /// Absolute value with the subgradient convention d|x|/dx = 1 at x = 0.
    pub fn abs(&self) -> Node {
        let partial = if self.value() < 0. { -1. } else { 1. };
        unary(format!("|{}|", self.name()), self.value().abs(), self, partial)
    }

    pub fn pow(&self, rhs: &Node) -> Node {
        let (x, y) = (self.value(), rhs.value());
        let z = x.powf(y);
        Node::op(
            format!("{}^{}", self.name(), rhs.name()),
            z,
            vec![
                Input {
                    term: self.clone(),
                    partial: y * x.powf(y - 1.),
                },
                Input {
                    term: rhs.clone(),
                    partial: z * x.ln(),
                },
            ],
        )
    }

    pub fn sigmoid(&self) -> Node {
        let z = 1. / (1. + (-self.value()).exp());
        unary(format!("sigmoid({})", self.name()), z, self, (1. - z) * z)
    }

    pub fn relu(&self) -> Node {
        let partial = if self.value() > 0. { 1. } else { 0. };
        unary(
            format!("relu({})", self.name()),
            self.value().max(0.),
            self,
            partial,
        )
    }
}

/// Pass-through node: the value and the derivative flow through unchanged.
/// [`max`] and [`min`] use it to graft the selected branch into the graph.
pub fn identity(x: &Node) -> Node {
    unary(format!("+{}", x.name()), x.value(), x, 1.)
}

/// The larger operand, as a pass-through of the winning branch, so the
/// derivative flows only into that branch. An exact tie selects `y`.
pub fn max(x: &Node, y: &Node) -> Node {
    if x.value() > y.value() {
        identity(x)
    } else {
        identity(y)
    }
}

/// The smaller operand, with the same branch routing as [`max`]; an exact
/// tie selects `y`.
pub fn min(x: &Node, y: &Node) -> Node {
    if x.value() < y.value() {
        identity(x)
    } else {
        identity(y)
    }
}

pub fn sum(terms: &[Node]) -> Node {
    let value = terms.iter().map(Node::value).sum();
    let inputs = terms
        .iter()
        .map(|term| Input {
            term: term.clone(),
            partial: 1.,
        })
        .collect();
    Node::op(format!("sum({})", name_list(terms)), value, inputs)
}

pub fn average(terms: &[Node]) -> Node {
    let n = terms.len() as f64;
    let value = terms.iter().map(Node::value).sum::<f64>() / n;
    let inputs = terms
        .iter()
        .map(|term| Input {
            term: term.clone(),
            partial: 1. / n,
        })
        .collect();
    Node::op(format!("avg({})", name_list(terms)), value, inputs)
}

/// Sum of pairwise products over the first min(len, len) pairs. Each left
/// operand's partial is the matching right operand's value and vice versa.
pub fn inner_product(xs: &[Node], ys: &[Node]) -> Node {
    let n = xs.len().min(ys.len());
    let (xs, ys) = (&xs[..n], &ys[..n]);
    let value = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| x.value() * y.value())
        .sum();
    let mut inputs = Vec::with_capacity(2 * n);
    inputs.extend(xs.iter().zip(ys).map(|(x, y)| Input {
        term: x.clone(),
        partial: y.value(),
    }));
    inputs.extend(xs.iter().zip(ys).map(|(x, y)| Input {
        term: y.clone(),
        partial: x.value(),
    }));
    Node::op(
        format!("dot([{}], [{}])", name_list(xs), name_list(ys)),
        value,
        inputs,
    )
}
