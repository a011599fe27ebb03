use tgs_core::ast::Expression;
use tgs_core::eval::Evaluator;
use tgs_core::metadata::{MULTI_VALUED_JOINER, normalize_tagname};
use tgs_core::multi::MultiValue;
use tgs_core::registry::{ArgumentBounds, FunctionEntry, FunctionRegistry};
use tgs_core::util::uniqify;

/// Tag names where `$unset(name:*)` removes every tag with that prefix.
const WILDCARD_UNSET_PREFIXES: [&str; 3] = ["performer:*", "comment:*", "lyrics:*"];

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(
        FunctionEntry::eager("set", fn_set, ArgumentBounds::exactly(2)).with_doc(
            "`$set(name,value)`\n\nSets the variable `name` to `value`. An empty value unsets the variable.",
        ),
    );
    registry.register(
        FunctionEntry::eager("setmulti", fn_setmulti, ArgumentBounds::between(2, 3)).with_doc(
            "`$setmulti(name,value,separator=\"; \")`\n\nSets `name` to `value`, splitting on the separator to restore a proper multi-valued tag.",
        ),
    );
    registry.register(
        FunctionEntry::eager("get", fn_get, ArgumentBounds::exactly(1))
            .with_doc("`$get(name)`\n\nReturns the variable `name` (equivalent to `%name%`)."),
    );
    registry.register(
        FunctionEntry::eager("unset", fn_unset, ArgumentBounds::exactly(1)).with_doc(
            "`$unset(name)`\n\nUnsets the variable `name`. Wildcards are allowed for `performer:*`, `comment:*` and `lyrics:*`.",
        ),
    );
    registry.register(
        FunctionEntry::eager("delete", fn_delete, ArgumentBounds::exactly(1)).with_doc(
            "`$delete(name)`\n\nUnsets the variable `name` and marks the tag for deletion.",
        ),
    );
    registry.register(
        FunctionEntry::eager("copy", fn_copy, ArgumentBounds::exactly(2)).with_doc(
            "`$copy(new,old)`\n\nCopies metadata from `old` to `new`, keeping multi-value variables intact.",
        ),
    );
    registry.register(
        FunctionEntry::eager("copymerge", fn_copymerge, ArgumentBounds::exactly(2)).with_doc(
            "`$copymerge(new,old)`\n\nMerges `old` into `new`, removing duplicates while keeping the original ordering.",
        ),
    );
    registry.register(
        FunctionEntry::lazy("getmulti", fn_getmulti, ArgumentBounds::between(2, 3)).with_doc(
            "`$getmulti(name,index,separator=\"; \")`\n\nGets the element at `index` from the multi-value tag `name`.",
        ),
    );
}

fn fn_set(ev: &mut Evaluator, args: &[String]) -> anyhow::Result<String> {
    let name = normalize_tagname(&args[0]);
    let value = &args[1];
    if value.is_empty() {
        unset_tag(ev, &name);
    } else {
        ev.context_mut().set_text(&name, value.clone());
    }
    Ok(String::new())
}

fn fn_setmulti(ev: &mut Evaluator, args: &[String]) -> anyhow::Result<String> {
    let name = normalize_tagname(&args[0]);
    let value = &args[1];
    let separator = args.get(2).map(String::as_str).unwrap_or(MULTI_VALUED_JOINER);
    if value.is_empty() {
        unset_tag(ev, &name);
    } else if separator.is_empty() {
        ev.context_mut().set_text(&name, value.clone());
    } else {
        let values = value.split(separator).map(str::to_string).collect();
        ev.context_mut().set(&name, values);
    }
    Ok(String::new())
}

fn fn_get(ev: &mut Evaluator, args: &[String]) -> anyhow::Result<String> {
    Ok(ev.context().get(&normalize_tagname(&args[0])))
}

fn fn_unset(ev: &mut Evaluator, args: &[String]) -> anyhow::Result<String> {
    unset_tag(ev, &normalize_tagname(&args[0]));
    Ok(String::new())
}

fn unset_tag(ev: &mut Evaluator, name: &str) {
    if WILDCARD_UNSET_PREFIXES.contains(&name) {
        let prefix = &name[..name.len() - 1];
        let matching: Vec<String> = ev
            .context()
            .keys()
            .filter(|key| key.starts_with(prefix))
            .map(str::to_string)
            .collect();
        for key in matching {
            ev.context_mut().unset(&key);
        }
    } else {
        ev.context_mut().unset(name);
    }
}

fn fn_delete(ev: &mut Evaluator, args: &[String]) -> anyhow::Result<String> {
    ev.context_mut().delete(&normalize_tagname(&args[0]));
    Ok(String::new())
}

fn fn_copy(ev: &mut Evaluator, args: &[String]) -> anyhow::Result<String> {
    let new = normalize_tagname(&args[0]);
    let old = normalize_tagname(&args[1]);
    let values = ev.context().getall(&old).to_vec();
    ev.context_mut().set(&new, values);
    Ok(String::new())
}

fn fn_copymerge(ev: &mut Evaluator, args: &[String]) -> anyhow::Result<String> {
    let new = normalize_tagname(&args[0]);
    let old = normalize_tagname(&args[1]);
    let mut values = ev.context().getall(&new).to_vec();
    values.extend(ev.context().getall(&old).iter().cloned());
    ev.context_mut().set(&new, uniqify(values));
    Ok(String::new())
}

fn fn_getmulti(ev: &mut Evaluator, args: &[Expression]) -> anyhow::Result<String> {
    if args[1].is_empty() {
        return Ok(String::new());
    }
    let index_text = args[1].eval(ev)?;
    let Ok(index) = index_text.trim().parse::<i64>() else {
        return Ok(String::new());
    };
    let multi = MultiValue::new(ev, &args[0], args.get(2))?;
    // Negative indices count from the end.
    let resolved = if index < 0 {
        multi.len() as i64 + index
    } else {
        index
    };
    if resolved < 0 {
        return Ok(String::new());
    }
    Ok(multi.get(resolved as usize).unwrap_or_default().to_string())
}
