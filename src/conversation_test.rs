use super::*;

#[test]
fn starts_empty() {
    let conversation = Conversation::new();
    assert!(conversation.is_empty());
    assert_eq!(conversation.len(), 0);
    assert!(conversation.turns().last().is_none());
}

#[test]
fn push_preserves_order() {
    let mut conversation = Conversation::new();
    conversation.push(Turn::user("hi"));
    conversation.push(Turn::assistant("hello"));
    conversation.push(Turn::chart(Figure::new()));

    assert_eq!(conversation.len(), 3);
    let roles: Vec<Role> = conversation.turns().iter().map(Turn::role).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant, Role::Assistant]);
    assert!(conversation.turns().last().is_some_and(Turn::is_chart));
}

#[test]
fn chart_turns_have_no_text() {
    let turn = Turn::chart(Figure::new());
    assert_eq!(turn.text(), None);
    assert_eq!(turn.role(), Role::Assistant);
    assert_eq!(Turn::user("q").text(), Some("q"));
}
