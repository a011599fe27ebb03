use tgs_core::ast::Expression;
use tgs_core::eval::Evaluator;
use tgs_core::registry::{ArgumentBounds, FunctionEntry, FunctionRegistry};

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(
        FunctionEntry::lazy("if", fn_if, ArgumentBounds::between(2, 3)).with_doc(
            "`$if(if,then,else)`\n\nIf `if` is not empty, it returns `then`, otherwise it returns `else`.",
        ),
    );
    registry.register(
        FunctionEntry::lazy("if2", fn_if2, ArgumentBounds::at_least(1))
            .with_doc("`$if2(a1,a2,a3,...)`\n\nReturns first non empty argument."),
    );
    registry.register(
        FunctionEntry::lazy("noop", fn_noop, ArgumentBounds::at_least(0))
            .with_doc("`$noop(...)`\n\nDoes nothing (useful for comments or disabling a block of code)."),
    );
}

fn fn_if(ev: &mut Evaluator, args: &[Expression]) -> anyhow::Result<String> {
    if !args[0].eval(ev)?.is_empty() {
        Ok(args[1].eval(ev)?)
    } else if let Some(alternative) = args.get(2) {
        Ok(alternative.eval(ev)?)
    } else {
        Ok(String::new())
    }
}

fn fn_if2(ev: &mut Evaluator, args: &[Expression]) -> anyhow::Result<String> {
    for arg in args {
        let value = arg.eval(ev)?;
        if !value.is_empty() {
            return Ok(value);
        }
    }
    Ok(String::new())
}

fn fn_noop(_: &mut Evaluator, _: &[Expression]) -> anyhow::Result<String> {
    Ok(String::new())
}
