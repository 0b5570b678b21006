//! Console walkthrough of scoped state.
//!
//! This example shows:
//! - Building the standard scope at startup
//! - Observers that re-render through `watch`
//! - Handlers that dispatch through `read`
//! - Tearing observers down
//!
//! Run with `RUST_LOG=scoped_state=debug` to see the container logs.

use scoped_state::prelude::*;
use scoped_state::ScopeError;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

fn counter_label(scope: &Rc<Scope>) -> Observer {
    let scope = scope.clone();
    Observer::new(move |observer| match scope.watch::<Counter>(observer) {
        Ok(count) => println!("[counter] {count}"),
        Err(err) => eprintln!("[counter] {err}"),
    })
}

fn header(scope: &Rc<Scope>) -> Observer {
    let scope = scope.clone();
    Observer::new(move |observer| {
        let name = scope.watch::<User>(observer);
        let dark = scope.watch::<Theme>(observer);
        if let (Ok(name), Ok(dark)) = (name, dark) {
            let mode = if dark { "dark" } else { "light" };
            println!("[header] hello, {name} ({mode} mode)");
        }
    })
}

fn task_view(scope: &Rc<Scope>) -> Observer {
    let scope = scope.clone();
    Observer::new(move |observer| {
        let Ok(tasks) = scope.watch::<TaskList>(observer) else {
            return;
        };
        if tasks.is_empty() {
            println!("[tasks] nothing to do");
        }
        for (index, task) in tasks.iter().enumerate() {
            println!("[tasks] {index}: {task}");
        }
    })
}

fn main() -> Result<(), ScopeError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let scope = Rc::new(Scope::standard()?);

    let views = [counter_label(&scope), header(&scope), task_view(&scope)];
    for view in &views {
        view.evaluate();
    }

    let counter = scope.read::<Counter>()?;
    counter.increment();
    counter.increment();
    counter.decrement();

    scope.read::<User>()?.change_name("Ada");
    scope.read::<Theme>()?.toggle();

    let tasks = scope.read::<TaskList>()?;
    tasks.add_task("buy milk");
    tasks.add_task("  ");
    tasks.add_task("walk the dog");
    tasks.remove_task(7);
    tasks.remove_task(0);

    let [label, header, task_view] = views;
    label.teardown();
    counter.reset();

    drop(header);
    scope.read::<User>()?.set_admin();

    task_view.teardown();
    println!("done: counter = {}", counter.count());
    Ok(())
}
