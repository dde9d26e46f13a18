use easylp_solver::{PivotRecord, Sense, TableauSnapshot};
use indexmap::IndexMap;

/// Up to three decimals, trailing zeros dropped, no signed zero
pub fn number(value: f64) -> String {
    if value.is_infinite() {
        return if value > 0.0 { "∞".to_string() } else { "-∞".to_string() };
    }
    let text = format!("{:.3}", value);
    let text = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text.as_str()
    };
    match text {
        "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Draws `rows` under `header` as a bordered grid. Every column is as wide
/// as its widest cell.
pub fn table(header: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let border = {
        let mut line = String::from("+");
        for w in &widths {
            line.push_str(&"-".repeat(w + 2));
            line.push('+');
        }
        line
    };
    let format_row = |cells: &[String]| {
        let mut line = String::from("|");
        for (cell, w) in cells.iter().zip(&widths) {
            let pad = w - cell.chars().count();
            line.push(' ');
            line.push_str(cell);
            line.push_str(&" ".repeat(pad + 1));
            line.push('|');
        }
        line
    };

    let mut out = vec![border.clone(), format_row(header), border.clone()];
    out.extend(rows.iter().map(|row| format_row(row.as_slice())));
    out.push(border);
    out.join("\n")
}

/// The tableau as a grid: objective row first, then one row per constraint
/// labelled with its basic variable. When a pivot follows, a `Ratio` column
/// shows the ratio test, `-` for rows it skips.
pub fn tableau(snapshot: &TableauSnapshot, objective_name: &str) -> String {
    let ratios = snapshot.ratio_test.as_ref().map(|test| &test.ratios);

    let mut header = vec!["Basic".to_string(), objective_name.to_string()];
    header.extend(snapshot.columns.iter().cloned());
    header.push("RHS".to_string());
    if ratios.is_some() {
        header.push("Ratio".to_string());
    }

    let mut rows = Vec::with_capacity(snapshot.rows.len() + 1);

    let mut objective = vec![objective_name.to_string(), "1".to_string()];
    objective.extend(snapshot.objective_row.iter().map(|&v| number(v)));
    objective.push(number(snapshot.objective_value));
    if ratios.is_some() {
        objective.push(String::new());
    }
    rows.push(objective);

    for (i, ((coefficients, rhs), name)) in snapshot
        .rows
        .iter()
        .zip(&snapshot.rhs)
        .zip(snapshot.basic_names())
        .enumerate()
    {
        let mut row = vec![name.to_string(), "0".to_string()];
        row.extend(coefficients.iter().map(|&v| number(v)));
        row.push(number(*rhs));
        if let Some(ratios) = ratios {
            row.push(match ratios.get(i).copied().flatten() {
                Some(ratio) => number(ratio),
                None => "-".to_string(),
            });
        }
        rows.push(row);
    }

    table(&header, &rows)
}

/// The vertex a tableau stands on:
/// `Basic: s1 = 24, s2 = 6 | Non-basic: x1 = 0, x2 = 0 | z = 0`
pub fn vertex(snapshot: &TableauSnapshot, objective_name: &str, sense: Sense) -> String {
    let basic = snapshot
        .basis
        .iter()
        .zip(&snapshot.rhs)
        .map(|(&var, &value)| format!("{} = {}", snapshot.columns[var], number(value)))
        .collect::<Vec<_>>()
        .join(", ");
    let non_basic = snapshot
        .columns
        .iter()
        .enumerate()
        .filter(|(j, _)| !snapshot.basis.contains(j))
        .map(|(_, name)| format!("{} = 0", name))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Basic: {} | Non-basic: {} | {} = {}",
        basic,
        non_basic,
        objective_name,
        number(sense.factor() * snapshot.objective_value)
    )
}

/// `x1 enters, s1 leaves (pivot 6, ratio 4)`
pub fn pivot_caption(record: &PivotRecord, columns: &[String]) -> String {
    let mut caption = format!(
        "{} enters, {} leaves (pivot {}, ratio {})",
        columns[record.entering],
        columns[record.leaving],
        number(record.pivot_value),
        number(record.ratio)
    );
    if record.is_degenerate() {
        caption.push_str(" [degenerate]");
    }
    caption
}

/// `x1 = 3, x2 = 1.5`
pub fn point(values: &IndexMap<String, f64>) -> String {
    values
        .iter()
        .map(|(name, value)| format!("{} = {}", name, number(*value)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `(4, 0)`
pub fn tuple(values: &IndexMap<String, f64>) -> String {
    let inner = values
        .values()
        .map(|v| number(*v))
        .collect::<Vec<_>>()
        .join(", ");
    format!("({})", inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use easylp_solver::{LpProblem, Sense, Solver};

    #[test]
    fn test_number() {
        assert_eq!(number(21.0), "21");
        assert_eq!(number(1.5), "1.5");
        assert_eq!(number(0.3333333), "0.333");
        assert_eq!(number(2.0 / 3.0), "0.667");
        assert_eq!(number(-0.0), "0");
        assert_eq!(number(-0.0001), "0");
        assert_eq!(number(-1.25), "-1.25");
        assert_eq!(number(100.0), "100");
        assert_eq!(number(f64::INFINITY), "∞");
        assert_eq!(number(f64::NEG_INFINITY), "-∞");
    }

    #[test]
    fn test_table_layout() {
        let header = vec!["a".to_string(), "long".to_string()];
        let rows = vec![vec!["123".to_string(), "x".to_string()]];
        let expected = "\
+-----+------+
| a   | long |
+-----+------+
| 123 | x    |
+-----+------+";
        assert_eq!(table(&header, &rows), expected);
    }

    #[test]
    fn test_initial_tableau() {
        let mut problem = LpProblem::new(vec!["x1".to_string(), "x2".to_string()]);
        problem.set_objective(vec![5.0, 4.0], Sense::Maximize);
        problem.add_constraint("c1", vec![6.0, 4.0], 24.0);
        problem.add_constraint("c2", vec![1.0, 2.0], 6.0);

        let report = Solver::new().solve(&problem).unwrap();
        let rendered = tableau(&report.trace[0], "z");
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 7);
        assert_eq!(lines[1], "| Basic | z | x1 | x2 | s1 | s2 | RHS | Ratio |");
        assert_eq!(lines[3], "| z     | 1 | -5 | -4 | 0  | 0  | 0   |       |");
        assert_eq!(lines[4], "| s1    | 0 | 6  | 4  | 1  | 0  | 24  | 4     |");
        assert_eq!(lines[5], "| s2    | 0 | 1  | 2  | 0  | 1  | 6   | 6     |");

        // No pivot follows the optimal tableau, so no ratio column
        let last = report.trace.last().unwrap();
        let rendered = tableau(last, "z");
        let header = rendered.lines().nth(1).unwrap();
        assert_eq!(header, "| Basic | z | x1 | x2 | s1 | s2 | RHS |");

        let first = report.trace[1].pivot.unwrap();
        assert_eq!(
            pivot_caption(&first, &report.trace[1].columns),
            "x1 enters, s1 leaves (pivot 6, ratio 4)"
        );
    }

    #[test]
    fn test_ratio_column_marks_skipped_rows() {
        let mut problem = LpProblem::new(vec!["x1".to_string(), "x2".to_string()]);
        problem.set_objective(vec![1.0, 0.0], Sense::Maximize);
        problem.add_constraint("c1", vec![-1.0, 1.0], 2.0);
        problem.add_constraint("c2", vec![2.0, 1.0], 3.0);

        let report = Solver::new().solve(&problem).unwrap();
        let rendered = tableau(&report.trace[0], "z");
        let lines: Vec<&str> = rendered.lines().collect();
        assert!(lines[4].ends_with("| 2   | -     |"), "{}", lines[4]);
        assert!(lines[5].ends_with("| 3   | 1.5   |"), "{}", lines[5]);
    }

    #[test]
    fn test_vertex_after_each_pivot() {
        let mut problem = LpProblem::new(vec!["x1".to_string(), "x2".to_string()]);
        problem.set_objective(vec![5.0, 4.0], Sense::Maximize);
        problem.add_constraint("c1", vec![6.0, 4.0], 24.0);
        problem.add_constraint("c2", vec![1.0, 2.0], 6.0);

        let report = Solver::new().solve(&problem).unwrap();
        assert_eq!(
            vertex(&report.trace[0], "z", Sense::Maximize),
            "Basic: s1 = 24, s2 = 6 | Non-basic: x1 = 0, x2 = 0 | z = 0"
        );
        assert_eq!(
            vertex(&report.trace[1], "z", Sense::Maximize),
            "Basic: x1 = 4, s2 = 2 | Non-basic: x2 = 0, s1 = 0 | z = 20"
        );
    }

    #[test]
    fn test_vertex_reports_minimized_objective() {
        let mut problem = LpProblem::new(vec!["x1".to_string()]);
        problem.set_objective(vec![-2.0], Sense::Minimize);
        problem.add_constraint("c1", vec![1.0], 3.0);

        let report = Solver::new().solve(&problem).unwrap();
        let last = report.trace.last().unwrap();
        assert_eq!(
            vertex(last, "cost", Sense::Minimize),
            "Basic: x1 = 3 | Non-basic: s1 = 0 | cost = -6"
        );
    }

    #[test]
    fn test_point_and_tuple() {
        let mut values = IndexMap::new();
        values.insert("x1".to_string(), 3.0);
        values.insert("x2".to_string(), 1.5);
        assert_eq!(point(&values), "x1 = 3, x2 = 1.5");
        assert_eq!(tuple(&values), "(3, 1.5)");
    }
}
