use super::*;

#[test]
fn editing_keeps_char_boundaries() {
    let mut input = Input::new(Some("hé"), Vec::new());
    assert_eq!(input.cursor, 3);
    input.move_left();
    assert_eq!(input.cursor, 1);
    input.insert_char('x');
    assert_eq!(input.buf, "hxé");
    input.move_right();
    input.backspace();
    assert_eq!(input.buf, "hx");
    input.backspace();
    input.backspace();
    input.backspace();
    assert_eq!(input.buf, "");
    assert_eq!(input.cursor, 0);
}

#[test]
fn history_walks_older_then_newer() {
    let mut input = Input::new(None, vec!["new".into(), "old".into()]);
    input.history_up();
    assert_eq!(input.buf, "new");
    input.history_up();
    assert_eq!(input.buf, "old");
    input.history_up();
    assert_eq!(input.buf, "old");
    input.history_down();
    assert_eq!(input.buf, "new");
    input.history_down();
    assert_eq!(input.buf, "");
    assert_eq!(input.history_pos, None);
}

#[test]
fn completion_cycles_choices() {
    let choices = vec!["main".to_string(), "maint".to_string(), "dev".to_string()];
    let mut input = Input::new(Some("ma"), Vec::new());
    input.complete(&choices);
    assert_eq!(input.buf, "main");
    input.complete(&choices);
    assert_eq!(input.buf, "maint");
    input.complete(&choices);
    assert_eq!(input.buf, "dev");

    let mut none = Input::new(Some("zz"), Vec::new());
    none.complete(&choices);
    assert_eq!(none.buf, "zz");
}
