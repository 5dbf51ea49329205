use revograd::{identity, Node};

#[test]
fn add_rule() {
    let x = Node::new("x", 2.);
    let y = Node::new("y", 7.);
    let z = &x + &y;

    z.backprop();
    assert_eq!(z.value(), 9.);
    assert_eq!(z.grad(), 1.);
    assert_eq!(x.grad(), 1.);
    assert_eq!(y.grad(), 1.);
}

#[test]
fn sub_rule() {
    let x = Node::new("x", 2.);
    let y = Node::new("y", 7.);
    let z = &x - &y;

    z.backprop();
    assert_eq!(z.value(), -5.);
    assert_eq!(x.grad(), 1.);
    assert_eq!(y.grad(), -1.);
}

#[test]
fn mul_rule() {
    let x = Node::new("x", 3.);
    let y = Node::new("y", 4.);
    let z = &x * &y;

    z.backprop();
    assert_eq!(z.value(), 12.);
    assert_eq!(x.grad(), 4.);
    assert_eq!(y.grad(), 3.);
}

#[test]
fn div_rule() {
    let x = Node::new("x", 3.);
    let y = Node::new("y", 2.);
    let z = &x / &y;

    z.backprop();
    assert_eq!(z.value(), 1.5);
    assert_eq!(x.grad(), 0.5);
    assert_eq!(y.grad(), -0.75);
}

#[test]
fn negation() {
    let x = Node::new("x", 3.);
    let z = -&x;

    z.backprop();
    assert_eq!(z.value(), -3.);
    assert_eq!(x.grad(), -1.);
}

#[test]
fn identity_passes_through() {
    let x = Node::new("x", 3.);
    let z = identity(&x);

    z.backprop();
    assert_eq!(z.value(), 3.);
    assert_eq!(x.grad(), 1.);
}

#[test]
fn set_rebinds_leaves_only() {
    let x = Node::new("x", 1.);
    let y = Node::new("y", 2.);
    let z = &x + &y;

    assert!(z.set(10.).is_err());
    x.set(5.).unwrap();
    assert_eq!(x.value(), 5.);
    // The existing operation node keeps the value it was built with.
    assert_eq!(z.value(), 3.);
}

#[test]
fn division_by_zero_propagates() {
    let x = Node::new("x", 1.);
    let y = Node::new("y", 0.);
    let z = &x / &y;

    assert!(z.value().is_infinite());
    z.backprop();
    assert!(x.grad().is_infinite());
    assert!(y.grad().is_infinite());
}
