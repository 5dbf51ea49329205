//! The computation graph cell and the two-phase backpropagation sweep.
//! See https://rufflewind.com/2016-12-30/reverse-mode-automatic-differentiation

use std::{
    cell::Cell,
    collections::{HashMap, VecDeque},
    io::Write,
    ops::{Add, Div, Mul, Neg, Sub},
    rc::Rc,
};

use crate::error::NonLeafError;

/// An input edge of an operation node: the operand and the local partial
/// derivative of the operation's value with respect to it, both fixed when
/// the node is built.
#[derive(Clone, Debug)]
pub(crate) struct Input {
    pub(crate) term: Node,
    pub(crate) partial: f64,
}

#[derive(Debug)]
struct NodePayload {
    name: String,
    value: Cell<f64>,
    grad: Cell<f64>,
    inputs: Box<[Input]>,
    // Scheduling state, meaningful only within a single backprop call.
    fan_out: Cell<u32>,
    fan_in_done: Cell<u32>,
    in_preparation: Cell<bool>,
}

impl NodePayload {
    fn new(name: String, value: f64, inputs: Box<[Input]>) -> NodePayload {
        Self {
            name,
            value: Cell::new(value),
            grad: Cell::new(0.),
            inputs,
            fan_out: Cell::new(0),
            fan_in_done: Cell::new(0),
            in_preparation: Cell::new(false),
        }
    }
}

/// A single cell of the computation graph, either a leaf variable or the
/// result of an operation. Handles share ownership of the underlying cell,
/// so cloning is cheap and a subexpression may feed any number of consumers.
#[derive(Clone, Debug)]
pub struct Node(Rc<NodePayload>);

impl Node {
    /// Create a leaf node holding a variable or constant.
    pub fn new(name: impl Into<String>, value: f64) -> Node {
        Self(Rc::new(NodePayload::new(name.into(), value, Box::new([]))))
    }

    pub(crate) fn op(name: String, value: f64, inputs: Vec<Input>) -> Node {
        Self(Rc::new(NodePayload::new(name, value, inputs.into())))
    }

    pub(crate) fn name(&self) -> &str {
        &self.0.name
    }

    /// The forward value, computed when this node was built.
    pub fn value(&self) -> f64 {
        self.0.value.get()
    }

    /// The partial derivative of the last backprop target with respect to
    /// this node. Zero until a backprop run has reached this node.
    pub fn grad(&self) -> f64 {
        self.0.grad.get()
    }

    /// Rebind the value of a leaf node, e.g. between iterations of an
    /// optimization loop. Operation nodes are frozen together with their
    /// local partials at construction, so they cannot be reassigned;
    /// rebuild the expression after updating its leaves.
    pub fn set(&self, value: f64) -> Result<(), NonLeafError> {
        if self.0.inputs.is_empty() {
            self.0.value.set(value);
            Ok(())
        } else {
            Err(NonLeafError)
        }
    }

    /// The entry point to backpropagation. Treats this node as the target
    /// and accumulates into every reachable node the exact partial
    /// derivative of the target with respect to it, summed over all paths.
    ///
    /// Runs over graphs that share nodes must not overlap; the queue is
    /// local to the call but the counters live on the shared cells.
    pub fn backprop(&self) {
        let mut queue = VecDeque::new();

        queue.push_back(self.clone());
        while let Some(term) = queue.pop_front() {
            term.prepare(&mut queue);
        }

        // The target's derivative with respect to itself.
        self.0.grad.set(1.);

        queue.push_back(self.clone());
        while let Some(term) = queue.pop_front() {
            term.calculate(&mut queue);
        }
    }

    /// First sweep: clear previous results and count the consumer edges of
    /// every reachable node. A node may get enqueued once per consumer; the
    /// `in_preparation` flag collapses the duplicates while each edge still
    /// bumps the source's fan-out.
    fn prepare(&self, queue: &mut VecDeque<Node>) {
        if self.0.in_preparation.get() {
            return;
        }
        self.0.in_preparation.set(true);
        self.0.grad.set(0.);
        self.0.fan_in_done.set(0);

        for input in self.0.inputs.iter() {
            let src = &input.term.0;
            src.fan_out.set(src.fan_out.get() + 1);
            if !src.in_preparation.get() {
                queue.push_back(input.term.clone());
            }
        }
    }

    /// Second sweep: push this node's accumulated derivative down its input
    /// edges. A source is released into the queue only once every consumer
    /// counted by `prepare` has contributed, which keeps the single pass
    /// exact on diamond-shaped graphs.
    fn calculate(&self, queue: &mut VecDeque<Node>) {
        if !self.0.in_preparation.get() {
            return;
        }
        self.0.in_preparation.set(false);

        for input in self.0.inputs.iter() {
            let src = &input.term.0;
            src.grad.set(src.grad.get() + self.0.grad.get() * input.partial);
            src.fan_in_done.set(src.fan_in_done.get() + 1);
            if src.fan_in_done.get() >= src.fan_out.get() {
                src.fan_out.set(0);
                queue.push_back(input.term.clone());
            }
        }
    }

    fn id(&self) -> usize {
        let payload = &*self.0;
        payload as *const _ as usize
    }

    /// Write graphviz dot file to the given writer.
    pub fn dot(&self, writer: &mut impl Write) -> std::io::Result<()> {
        let mut map = HashMap::new();
        self.accum(&mut map);
        writeln!(writer, "digraph G {{\nrankdir=\"LR\";")?;
        for (id, (payload, _)) in &map {
            writeln!(
                writer,
                "a{} [label=\"{} \\nvalue:{}, grad:{}\"];",
                *id,
                payload.name,
                payload.value.get(),
                payload.grad.get()
            )?;
        }
        for (id, (_, parents)) in &map {
            for pid in parents {
                writeln!(writer, "a{} -> a{};", pid, *id)?;
            }
        }
        writeln!(writer, "}}")?;
        Ok(())
    }

    fn accum<'a>(&'a self, map: &mut HashMap<usize, (&'a NodePayload, Vec<usize>)>) {
        if map.contains_key(&self.id()) {
            return;
        }
        let parents = self
            .0
            .inputs
            .iter()
            .map(|input| {
                input.term.accum(map);
                input.term.id()
            })
            .collect();
        map.insert(self.id(), (&*self.0, parents));
    }
}

impl Add for &Node {
    type Output = Node;
    fn add(self, rhs: Self) -> Self::Output {
        let name = format!("({} + {})", self.name(), rhs.name());
        Node::op(
            name,
            self.value() + rhs.value(),
            vec![
                Input {
                    term: self.clone(),
                    partial: 1.,
                },
                Input {
                    term: rhs.clone(),
                    partial: 1.,
                },
            ],
        )
    }
}

impl Sub for &Node {
    type Output = Node;
    fn sub(self, rhs: Self) -> Self::Output {
        let name = format!("({} - {})", self.name(), rhs.name());
        Node::op(
            name,
            self.value() - rhs.value(),
            vec![
                Input {
                    term: self.clone(),
                    partial: 1.,
                },
                Input {
                    term: rhs.clone(),
                    partial: -1.,
                },
            ],
        )
    }
}

impl Mul for &Node {
    type Output = Node;
    fn mul(self, rhs: Self) -> Self::Output {
        let name = format!("{} * {}", self.name(), rhs.name());
        Node::op(
            name,
            self.value() * rhs.value(),
            vec![
                Input {
                    term: self.clone(),
                    partial: rhs.value(),
                },
                Input {
                    term: rhs.clone(),
                    partial: self.value(),
                },
            ],
        )
    }
}

impl Div for &Node {
    type Output = Node;
    fn div(self, rhs: Self) -> Self::Output {
        let name = format!("{} / {}", self.name(), rhs.name());
        Node::op(
            name,
            self.value() / rhs.value(),
            vec![
                Input {
                    term: self.clone(),
                    partial: 1. / rhs.value(),
                },
                Input {
                    term: rhs.clone(),
                    partial: -self.value() / (rhs.value() * rhs.value()),
                },
            ],
        )
    }
}

impl Neg for &Node {
    type Output = Node;
    fn neg(self) -> Self::Output {
        let name = format!("-{}", self.name());
        Node::op(
            name,
            -self.value(),
            vec![Input {
                term: self.clone(),
                partial: -1.,
            }],
        )
    }
}
