//! `STRUCT=fields=data=delim=body`: row-at-a-time rendering of a delimited
//! table.
//!
//! `fields` is the name of a tag whose value lists the column names, or the
//! list itself; `data` names a value-bearing tag holding the cells. Both are
//! `delim`-terminated lists, and the cells are consumed one row (one cell per
//! column) at a time:
//!
//! ```text
//! cols = "name,qty,"      rows = "tea,2,cake,1,"
//! <!--%STRUCT=cols=rows=,=<!--%name%-->x<!--%qty%--> %-->   =>   teax2 cakex1
//! ```
//!
//! Each row binds every column name to its cell plus a 1-based counter named
//! `row_number` (or `row_number_2`, ... inside another loop), then renders
//! `body`. The bindings are scoped to the tag. A list entry without its
//! terminating delimiter writes a diagnostic in place of the remaining
//! bindings for that row; the row's body is still rendered and the loop stops
//! once a row consumes no data.

use std::io::Write;

use weft::{Fields, Registry, Result, TemplateError, TypedTag, ValueTag};

pub const STRUCT: &str = "STRUCT";
/// Base name of the 1-based row counter.
pub const ROW_NUMBER_NAME: &str = "row_number";
pub const HEADER_UNTERMINATED: &str = "header list is missing ending delimiter";
pub const DATA_UNTERMINATED: &str = "data list is missing ending delimiter";

pub fn struct_tag() -> TypedTag {
    TypedTag::new(STRUCT, render_rows)
}

/// Column names split from `list`, and whether the last one was terminated.
fn column_names<'a>(list: &'a str, delimiter: &str) -> (Vec<&'a str>, bool) {
    let mut names = Vec::new();
    let mut rest = list;
    while !rest.is_empty() {
        match rest.find(delimiter) {
            Some(end) => {
                names.push(&rest[..end]);
                rest = &rest[end + delimiter.len()..];
            }
            None => return (names, false),
        }
    }
    (names, true)
}

fn render_rows(fields: Fields<'_>, registry: &mut Registry, out: &mut dyn Write) -> Result<()> {
    let header = match registry.value_of(fields.get(1)) {
        Some(value) => value.to_owned(),
        None => fields.get_str(1).into_owned(),
    };
    let Some(data) = registry.value_of(fields.get(2)).map(str::to_owned) else {
        tracing::debug!(data = %fields.get_str(2), "no data for STRUCT");
        return Ok(());
    };
    let delimiter = fields.get_str(3).into_owned();
    let body = fields.rest(4);

    if delimiter.is_empty() {
        tracing::debug!("STRUCT without a delimiter renders nothing");
        return Ok(());
    }
    let (columns, header_complete) = column_names(&header, &delimiter);
    if columns.is_empty() && header_complete {
        tracing::debug!("STRUCT without columns renders nothing");
        return Ok(());
    }

    let limit = registry.max_repeat_iterations();
    registry.scoped(|registry| {
        let counter = registry.free_name(ROW_NUMBER_NAME);
        let mut rest = data.as_str();
        let mut row: usize = 0;

        while !rest.is_empty() {
            if let Some(limit) = limit.filter(|&limit| row >= limit) {
                tracing::warn!(limit, "STRUCT stopped at iteration limit");
                return Err(TemplateError::IterationLimit {
                    name: STRUCT.to_string(),
                    limit,
                });
            }
            row += 1;
            registry.bind(ValueTag::new(counter.clone(), row.to_string()));

            let consumed_before = rest.len();
            let mut data_ran_out = false;
            for column in &columns {
                let Some(end) = rest.find(delimiter.as_str()) else {
                    out.write_all(DATA_UNTERMINATED.as_bytes())?;
                    data_ran_out = true;
                    break;
                };
                registry.bind(ValueTag::new(*column, &rest[..end]));
                rest = &rest[end + delimiter.len()..];
            }
            if !data_ran_out && !header_complete {
                out.write_all(HEADER_UNTERMINATED.as_bytes())?;
            }

            registry.evaluate_bytes(body, out)?;

            if rest.len() == consumed_before {
                tracing::debug!(row, "STRUCT row consumed no data, stopping");
                break;
            }
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.add(struct_tag());
        registry
    }

    #[test]
    fn splits_column_names() {
        assert_eq!(column_names("a,b,", ","), (vec!["a", "b"], true));
        assert_eq!(column_names("a,b", ","), (vec!["a"], false));
        assert_eq!(column_names("", ","), (vec![], true));
        assert_eq!(column_names("x::y::", "::"), (vec!["x", "y"], true));
    }

    #[test]
    fn renders_one_body_per_row() {
        let mut registry = registry();
        registry.set("cols", "name,qty,");
        registry.set("rows", "tea,2,cake,1,");
        let out = registry
            .render_str("<!--%STRUCT=cols=rows=,=<!--%name%-->x<!--%qty%--> %-->")
            .unwrap();
        assert_eq!(out, "teax2 cakex1 ");
    }

    #[test]
    fn literal_header_list() {
        let mut registry = registry();
        registry.set("rows", "1;2;3;4;");
        let out = registry
            .render_str("<!--%STRUCT=a;b;=rows=;=(<!--%a%-->,<!--%b%-->)%-->")
            .unwrap();
        assert_eq!(out, "(1,2)(3,4)");
    }

    #[test]
    fn row_counter_and_scoping() {
        let mut registry = registry();
        registry.set("cols", "v,");
        registry.set("rows", "x,y,");
        let out = registry
            .render_str("<!--%STRUCT=cols=rows=,=<!--%row_number%-->:<!--%v%--> %-->")
            .unwrap();
        assert_eq!(out, "1:x 2:y ");
        assert!(registry.get("v").is_none());
        assert!(registry.get(ROW_NUMBER_NAME).is_none());
    }

    #[test]
    fn missing_data_renders_nothing() {
        let mut registry = registry();
        assert_eq!(registry.render_str("<!--%STRUCT=a,=nobody=,=x%-->").unwrap(), "");
    }

    #[test]
    fn unterminated_data_is_reported() {
        let mut registry = registry();
        registry.set("rows", "1,2,3");
        let out = registry
            .render_str("<!--%STRUCT=a,b,=rows=,=[<!--%a%--><!--%b%-->]%-->")
            .unwrap();
        assert_eq!(out, format!("[12]{DATA_UNTERMINATED}[12]"));
    }

    #[test]
    fn unterminated_header_is_reported() {
        let mut registry = registry();
        registry.set("rows", "1,2,");
        let out = registry
            .render_str("<!--%STRUCT=a,b=rows=,=[<!--%a%-->]%-->")
            .unwrap();
        assert_eq!(
            out,
            format!("{HEADER_UNTERMINATED}[1]{HEADER_UNTERMINATED}[2]")
        );
    }

    #[test]
    fn honours_iteration_limit() {
        let mut registry = registry();
        registry.set_max_repeat_iterations(Some(1));
        registry.set("rows", "1,2,");
        let result = registry.render_str("<!--%STRUCT=a,=rows=,=<!--%a%-->%-->");
        assert!(matches!(result, Err(TemplateError::IterationLimit { limit: 1, .. })));
    }
}
