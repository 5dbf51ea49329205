//! max/min select one branch at construction time; the derivative must flow
//! only through the selected operand, with ties going to the second one.

use revograd::{max, min, Node};

#[test]
fn max_routes_to_larger() {
    let x = Node::new("x", 2.);
    let y = Node::new("y", 1.);
    let z = max(&x, &y);

    z.backprop();
    assert_eq!(z.value(), 2.);
    assert_eq!(x.grad(), 1.);
    assert_eq!(y.grad(), 0.);
}

#[test]
fn max_tie_routes_to_second() {
    let x = Node::new("x", 1.);
    let y = Node::new("y", 1.);
    let z = max(&x, &y);

    z.backprop();
    assert_eq!(x.grad(), 0.);
    assert_eq!(y.grad(), 1.);
}

#[test]
fn min_routes_to_smaller() {
    let x = Node::new("x", 1.);
    let y = Node::new("y", 2.);
    let z = min(&x, &y);

    z.backprop();
    assert_eq!(z.value(), 1.);
    assert_eq!(x.grad(), 1.);
    assert_eq!(y.grad(), 0.);
}

#[test]
fn min_tie_routes_to_second() {
    let x = Node::new("x", 1.);
    let y = Node::new("y", 1.);
    let z = min(&x, &y);

    z.backprop();
    assert_eq!(x.grad(), 0.);
    assert_eq!(y.grad(), 1.);
}

#[test]
fn abs_subgradient() {
    let x = Node::new("x", -3.);
    let z = x.abs();
    z.backprop();
    assert_eq!(z.value(), 3.);
    assert_eq!(x.grad(), -1.);

    // At zero the convention picks the positive branch.
    let x = Node::new("x", 0.);
    let z = x.abs();
    z.backprop();
    assert_eq!(x.grad(), 1.);
}

#[test]
fn relu_gates_the_gradient() {
    let x = Node::new("x", 2.);
    let z = x.relu();
    z.backprop();
    assert_eq!(z.value(), 2.);
    assert_eq!(x.grad(), 1.);

    let x = Node::new("x", -1.);
    let z = x.relu();
    z.backprop();
    assert_eq!(z.value(), 0.);
    assert_eq!(x.grad(), 0.);

    // Zero sits on the flat side.
    let x = Node::new("x", 0.);
    let z = x.relu();
    z.backprop();
    assert_eq!(x.grad(), 0.);
}
