use revograd::Node;

fn main() {
    // y = (a * exp(x)) * (exp(x) + b)
    let x = Node::new("x", 1.);
    let a = Node::new("a", 2.);
    let b = Node::new("b", 3.);

    let c = x.exp();
    let d = &a * &c;
    let e = &c + &b;
    let y = &d * &e;
    y.backprop();
    println!("{}\t{}", y.value(), x.grad());

    // The same expression without naming the intermediates.
    let y = &(&a * &x.exp()) * &(&x.exp() + &b);
    y.backprop();
    println!("{}\t{}", y.value(), x.grad());

    // y = 5 x^2, written as a loop.
    let x = Node::new("x", 3.);
    let mut y = Node::new("y", 0.);
    for _ in 0..5 {
        y = &y + &(&x * &x);
    }
    y.backprop();
    println!("{}\t{}", y.value(), x.grad());

    // Minimum of (x - 5)^2 by steepest descent, rebinding x and rebuilding
    // the expression every step.
    let x = Node::new("x", 20.);
    let five = Node::new("5", 5.);
    let mut y = loss(&x, &five);
    y.backprop();
    while x.grad() * x.grad() >= 1e-20 {
        x.set(x.value() - 0.1 * x.grad()).unwrap();
        y = loss(&x, &five);
        y.backprop();
    }
    println!("{}\t{}", y.value(), x.value());
}

fn loss(x: &Node, five: &Node) -> Node {
    let diff = x - five;
    &diff * &diff
}
