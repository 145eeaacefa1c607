//! Tests for conditional formatting against a grid

use gridcalc::prelude::*;
use gridcalc::{format_preset, FormatProperty, DEFAULT_EDITOR_FILL, DISPLAY_ERROR_MARKER};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const RED: Color = Color::rgb(0xF4, 0xCC, 0xCC);
const BLUE: Color = Color::rgb(0xD0, 0xE0, 0xE3);

fn grid_with(rows: usize, cols: usize, cells: &[(&str, &str)]) -> Grid {
    let mut grid = Grid::new(rows, cols);
    for (addr, text) in cells {
        grid.set_cell(addr, *text).unwrap();
    }
    grid
}

fn range(s: &str) -> RuleRange {
    RuleRange::parse(s).unwrap()
}

fn background(grid: &Grid, addr: &str) -> Color {
    let addr = CellAddress::parse(addr).unwrap();
    grid.formatting_at(addr.row, addr.col).unwrap().background
}

#[test]
fn test_greater_than_highlights_matches() {
    let mut grid = grid_with(3, 1, &[("A1", "5"), ("A2", "15"), ("A3", "25")]);
    let mut engine = RuleEngine::new();
    engine.push_rule(
        ConditionalRule::greater_than(1, "10")
            .with_range(range("A1:A3"))
            .with_format(FormatDelta::new().with_background(RED)),
    );
    engine.apply_conditional_formatting_to_grid(&mut grid).unwrap();

    assert_eq!(background(&grid, "A1"), Color::Auto);
    assert_eq!(background(&grid, "A2"), RED);
    assert_eq!(background(&grid, "A3"), RED);

    let tracked: Vec<_> = engine.tracked_cells().map(|a| a.to_string()).collect();
    assert_eq!(tracked, vec!["A2", "A3"]);
}

#[test]
fn test_later_rule_overrides_per_property() {
    let mut grid = grid_with(1, 1, &[("A1", "50")]);
    let mut engine = RuleEngine::new();
    engine.push_rule(
        ConditionalRule::greater_than(1, "10")
            .with_format(FormatDelta::new().with_background(RED).with_bold(true)),
    );
    engine.push_rule(
        ConditionalRule::greater_than(2, "20").with_format(FormatDelta::new().with_background(BLUE)),
    );
    engine.apply_conditional_formatting_to_grid(&mut grid).unwrap();

    let formatting = grid.formatting_at(0, 0).unwrap();
    assert_eq!(formatting.background, BLUE);
    assert!(formatting.bold);
}

#[test]
fn test_reset_clears_stale_matches() {
    let mut grid = grid_with(1, 1, &[("A1", "50")]);
    let mut engine = RuleEngine::new();
    engine.push_rule(
        ConditionalRule::greater_than(1, "10").with_format(FormatDelta::fill(RED, Color::WHITE)),
    );
    engine.settle(&mut grid).unwrap();
    assert_eq!(background(&grid, "A1"), RED);

    grid.set_cell("A1", "3").unwrap();
    engine.notify_grid_changed();
    engine.settle(&mut grid).unwrap();

    assert_eq!(grid.formatting_at(0, 0).unwrap(), &CellFormatting::default());
    assert_eq!(engine.tracked_cells().count(), 0);
}

#[test]
fn test_user_formatting_survives_reset() {
    let mut grid = grid_with(1, 1, &[("A1", "50")]);
    {
        let formatting = grid.formatting_at_mut(0, 0).unwrap();
        formatting.italic = true;
        formatting.background = BLUE;
    }

    let mut engine = RuleEngine::new();
    let id = engine.push_rule(
        ConditionalRule::greater_than(1, "10")
            .with_format(FormatDelta::new().with_bold(true).with_text_color(Color::WHITE)),
    );
    engine.settle(&mut grid).unwrap();

    let formatting = grid.formatting_at(0, 0).unwrap();
    assert!(formatting.bold && formatting.italic);
    assert_eq!(formatting.background, BLUE);
    assert_eq!(
        formatting.rule_origin,
        [FormatProperty::TextColor, FormatProperty::Bold].into_iter().collect()
    );

    engine.delete_conditional_rule(id).unwrap();
    engine.settle(&mut grid).unwrap();

    let formatting = grid.formatting_at(0, 0).unwrap();
    assert!(!formatting.bold);
    assert!(formatting.italic);
    assert_eq!(formatting.background, BLUE);
    assert_eq!(formatting.text_color, Color::BLACK);
    assert!(!formatting.has_rule_formatting());
}

#[test]
fn test_rule_overriding_user_property_resets_to_default() {
    let mut grid = grid_with(1, 1, &[("A1", "50")]);
    grid.formatting_at_mut(0, 0).unwrap().background = BLUE;

    let mut engine = RuleEngine::new();
    let id = engine.push_rule(
        ConditionalRule::greater_than(1, "10").with_format(FormatDelta::new().with_background(RED)),
    );
    engine.settle(&mut grid).unwrap();
    assert_eq!(background(&grid, "A1"), RED);

    engine.delete_conditional_rule(id).unwrap();
    engine.settle(&mut grid).unwrap();
    assert_eq!(background(&grid, "A1"), Color::Auto);
}

#[test]
fn test_range_clipped_to_grid() {
    let mut grid = grid_with(2, 2, &[("A1", "x"), ("B2", "y")]);
    let mut engine = RuleEngine::new();
    engine.push_rule(
        ConditionalRule::new(1, ConditionKind::NotEmpty)
            .with_range(range("Z99:A1"))
            .with_format(FormatDelta::new().with_underline(true)),
    );
    engine.push_rule(
        ConditionalRule::new(2, ConditionKind::Empty)
            .with_range(range("E5:F6"))
            .with_format(FormatDelta::new().with_underline(true)),
    );
    engine.settle(&mut grid).unwrap();

    let tracked: Vec<_> = engine.tracked_cells().map(|a| a.to_string()).collect();
    assert_eq!(tracked, vec!["A1", "B2"]);
}

#[test]
fn test_shrunk_grid_untracks_cells() {
    struct Shrinkable {
        grid: Grid,
        rows: usize,
    }

    impl CellSource for Shrinkable {
        fn row_count(&self) -> usize {
            self.rows
        }
        fn col_count(&self) -> usize {
            self.grid.col_count()
        }
        fn cell_text(&self, row: usize, col: usize) -> Option<&str> {
            if row < self.rows {
                self.grid.cell_text(row, col)
            } else {
                None
            }
        }
    }

    impl FormattingStore for Shrinkable {
        fn cell_formatting(&self, row: usize, col: usize) -> Option<&CellFormatting> {
            self.grid.cell_formatting(row, col)
        }
        fn update_cell_formatting(
            &mut self,
            row: usize,
            col: usize,
            formatting: CellFormatting,
        ) -> gridcalc_core::Result<()> {
            self.grid.update_cell_formatting(row, col, formatting)
        }
    }

    let mut source = Shrinkable {
        grid: grid_with(3, 1, &[("A1", "1"), ("A2", "2"), ("A3", "3")]),
        rows: 3,
    };
    let mut engine = RuleEngine::new();
    engine.push_rule(
        ConditionalRule::new(1, ConditionKind::NotEmpty)
            .with_range(range("A1:A3"))
            .with_format(FormatDelta::new().with_bold(true)),
    );
    engine.settle(&mut source).unwrap();
    assert_eq!(engine.tracked_cells().count(), 3);

    source.rows = 1;
    engine.notify_grid_changed();
    engine.settle(&mut source).unwrap();

    let tracked: Vec<_> = engine.tracked_cells().map(|a| a.to_string()).collect();
    assert_eq!(tracked, vec!["A1"]);
}

#[test]
fn test_inserted_row_clears_shifted_rule_formatting() {
    let mut grid = grid_with(2, 1, &[("A1", "x")]);
    grid.formatting_at_mut(0, 0).unwrap().italic = true;
    let mut engine = RuleEngine::new();
    engine.push_rule(
        ConditionalRule::new(1, ConditionKind::NotEmpty)
            .with_range(range("A1:A1"))
            .with_format(FormatDelta::new().with_bold(true)),
    );
    engine.settle(&mut grid).unwrap();
    assert!(grid.formatting_at(0, 0).unwrap().bold);

    grid.insert_row(0).unwrap();
    engine.notify_grid_changed();
    engine.settle(&mut grid).unwrap();

    let shifted = grid.formatting_at(1, 0).unwrap();
    assert_eq!(grid.cell_text(1, 0), Some("x"));
    assert!(!shifted.bold);
    assert!(shifted.italic);
    assert!(!shifted.has_rule_formatting());
    assert_eq!(engine.tracked_cells().count(), 0);
}

#[test]
fn test_inserted_column_clears_shifted_rule_formatting() {
    let mut grid = grid_with(1, 2, &[("A1", "x")]);
    let mut engine = RuleEngine::new();
    engine.push_rule(
        ConditionalRule::new(1, ConditionKind::NotEmpty)
            .with_range(range("A1:A1"))
            .with_format(FormatDelta::new().with_background(RED)),
    );
    engine.settle(&mut grid).unwrap();

    grid.insert_column(0).unwrap();
    engine.notify_grid_changed();
    engine.settle(&mut grid).unwrap();

    assert_eq!(background(&grid, "B1"), Color::Auto);
    assert_eq!(grid.formatting_at(0, 1).unwrap(), &CellFormatting::default());
}

#[test]
fn test_settle_coalesces_notifications() {
    let mut grid = grid_with(1, 1, &[("A1", "1")]);
    let mut engine = RuleEngine::new();

    assert!(!engine.settle(&mut grid).unwrap());

    engine.push_rule(ConditionalRule::new(1, ConditionKind::NotEmpty));
    engine.notify_grid_changed();
    engine.notify_grid_changed();
    engine.notify_rules_changed();
    assert!(engine.is_pending());

    assert!(engine.settle(&mut grid).unwrap());
    assert!(!engine.is_pending());
    assert!(!engine.settle(&mut grid).unwrap());
}

#[test]
fn test_editor_flow() {
    let mut grid = grid_with(2, 2, &[("A1", "hello"), ("B2", "world")]);
    let mut engine = RuleEngine::new();

    engine.open_conditional_formatting(range("A1:B2"));
    assert!(engine.editor().is_open);
    let id = engine.add_conditional_rule();
    assert!(!engine.editor().is_open);
    engine.settle(&mut grid).unwrap();

    // Defaults: not_empty with the light green fill
    assert_eq!(background(&grid, "A1"), DEFAULT_EDITOR_FILL);
    assert_eq!(background(&grid, "A2"), Color::Auto);

    engine.edit_conditional_rule(id).unwrap();
    assert_eq!(engine.editor().editing_rule, Some(id));
    {
        let editor = engine.editor_mut();
        editor.selected_kind = ConditionKind::TextContains;
        editor.criterion1 = "wor".into();
        editor.selected_format = format_preset("light red fill").unwrap().to_delta();
    }
    engine.update_conditional_rule().unwrap();
    engine.settle(&mut grid).unwrap();

    assert_eq!(engine.rules().len(), 1);
    assert_eq!(engine.rule(id).unwrap().kind, ConditionKind::TextContains);
    assert_eq!(background(&grid, "A1"), Color::Auto);
    assert_eq!(background(&grid, "B2"), RED);

    engine.delete_conditional_rule(id).unwrap();
    engine.settle(&mut grid).unwrap();
    assert!(engine.rules().is_empty());
    assert_eq!(background(&grid, "B2"), Color::Auto);
}

#[test]
fn test_close_discards_draft() {
    let mut engine = RuleEngine::new();
    engine.open_conditional_formatting(range("A1"));
    engine.editor_mut().criterion1 = "draft".into();
    engine.close_conditional_formatting();

    assert!(!engine.editor().is_open);
    assert!(engine.rules().is_empty());
    assert!(!engine.is_pending());
}

#[test]
fn test_conditions_see_display_values() {
    let mut grid = grid_with(1, 3, &[("A1", "=B1"), ("B1", "=A1"), ("C1", "=2*3")]);
    let mut engine = RuleEngine::new();
    engine.push_rule(
        ConditionalRule::new(1, ConditionKind::TextExactly)
            .with_criterion1(DISPLAY_ERROR_MARKER)
            .with_range(range("A1:C1"))
            .with_format(FormatDelta::new().with_background(RED)),
    );
    engine.push_rule(
        ConditionalRule::new(2, ConditionKind::EqualTo)
            .with_criterion1("6")
            .with_range(range("A1:C1"))
            .with_format(FormatDelta::new().with_background(BLUE)),
    );
    engine.settle(&mut grid).unwrap();

    assert_eq!(background(&grid, "A1"), RED);
    assert_eq!(background(&grid, "B1"), RED);
    assert_eq!(background(&grid, "C1"), BLUE);
}

#[test]
fn test_date_rules() {
    let mut grid = grid_with(
        3,
        1,
        &[("A1", "2024-01-10"), ("A2", "03/15/2024"), ("A3", "not a date")],
    );
    let mut engine = RuleEngine::new();
    engine.push_rule(
        ConditionalRule::new(1, ConditionKind::DateBefore)
            .with_criterion1("2024-02-01")
            .with_range(range("A1:A3"))
            .with_format(FormatDelta::new().with_background(RED)),
    );
    engine.push_rule(
        ConditionalRule::new(2, ConditionKind::DateIs)
            .with_criterion1("March 15, 2024")
            .with_range(range("A1:A3"))
            .with_format(FormatDelta::new().with_background(BLUE)),
    );
    engine.settle(&mut grid).unwrap();

    assert_eq!(background(&grid, "A1"), RED);
    assert_eq!(background(&grid, "A2"), BLUE);
    assert_eq!(background(&grid, "A3"), Color::Auto);
}

#[test]
fn test_grid_growth_keeps_rule_formatting_in_place() {
    let mut grid = grid_with(2, 2, &[("A1", "1"), ("B2", "2")]);
    let mut engine = RuleEngine::new();
    engine.push_rule(
        ConditionalRule::new(1, ConditionKind::NotEmpty)
            .with_range(range("A1:C3"))
            .with_format(FormatDelta::new().with_background(RED)),
    );
    engine.settle(&mut grid).unwrap();

    grid.add_row();
    grid.add_column();
    grid.set_cell("C3", "3").unwrap();
    engine.notify_grid_changed();
    engine.settle(&mut grid).unwrap();

    assert_eq!(background(&grid, "A1"), RED);
    assert_eq!(background(&grid, "B2"), RED);
    assert_eq!(background(&grid, "C3"), RED);
    assert_eq!(background(&grid, "C1"), Color::Auto);
}

#[test]
fn test_custom_expression_rule() {
    let mut grid = grid_with(1, 4, &[("A1", "7"), ("B1", "12"), ("C1", "foobar"), ("D1", "")]);
    let mut engine = RuleEngine::new();
    engine.push_rule(
        ConditionalRule::custom_expression(1, r#"> 5 && < 10 || contains "foo""#)
            .with_range(range("A1:D1"))
            .with_format(FormatDelta::new().with_bold(true)),
    );
    engine.settle(&mut grid).unwrap();

    let bold: Vec<bool> = (0..4)
        .map(|col| grid.formatting_at(0, col).unwrap().bold)
        .collect();
    assert_eq!(bold, vec![true, false, true, false]);
}

fn arb_kind() -> impl Strategy<Value = ConditionKind> {
    prop::sample::select(
        ConditionKind::ALL
            .iter()
            .copied()
            .filter(|k| !matches!(k, ConditionKind::CustomFormula))
            .collect::<Vec<_>>(),
    )
}

fn arb_rule() -> impl Strategy<Value = ConditionalRule> {
    (
        arb_kind(),
        "-?[0-9]{1,2}|[a-c]{0,2}",
        "-?[0-9]{1,2}",
        (0usize..4, 0usize..4, 0usize..4, 0usize..4),
        any::<(bool, bool)>(),
    )
        .prop_map(|(kind, c1, c2, (r1, c1i, r2, c2i), (bold, red))| {
            let mut format = FormatDelta::new().with_bold(bold);
            if red {
                format = format.with_background(RED);
            }
            ConditionalRule::new(0, kind)
                .with_criterion1(c1)
                .with_criterion2(c2)
                .with_range(RuleRange::new(r1, c1i, r2, c2i))
                .with_format(format)
        })
}

proptest! {
    #[test]
    fn reapplication_is_idempotent(
        cells in prop::collection::vec("-?[0-9]{1,2}|[a-c]{0,3}", 9),
        rules in prop::collection::vec(arb_rule(), 0..4),
    ) {
        let rows: Vec<Vec<String>> = cells.chunks(3).map(|c| c.to_vec()).collect();
        let mut grid = Grid::from_rows(rows);
        let mut engine = RuleEngine::new();
        for rule in rules {
            engine.push_rule(rule);
        }

        engine.apply_conditional_formatting_to_grid(&mut grid).unwrap();
        let once = grid.clone();
        engine.apply_conditional_formatting_to_grid(&mut grid).unwrap();

        prop_assert_eq!(once, grid);
    }

    #[test]
    fn removing_all_rules_restores_defaults(
        cells in prop::collection::vec("-?[0-9]{1,2}|[a-c]{0,3}", 9),
        rules in prop::collection::vec(arb_rule(), 1..4),
    ) {
        let rows: Vec<Vec<String>> = cells.chunks(3).map(|c| c.to_vec()).collect();
        let mut grid = Grid::from_rows(rows);
        let pristine = grid.clone();

        let mut engine = RuleEngine::new();
        let ids: Vec<u64> = rules.into_iter().map(|r| engine.push_rule(r)).collect();
        engine.settle(&mut grid).unwrap();
        for id in ids {
            engine.delete_conditional_rule(id).unwrap();
        }
        engine.settle(&mut grid).unwrap();

        prop_assert_eq!(pristine, grid);
    }
}
