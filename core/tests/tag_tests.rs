use chatsphere_core::chat_list::ChatList;
use chatsphere_core::config::ClientConfig;
use chatsphere_core::filters::Filter;
use chatsphere_core::repository::{ChatRepository, RepositoryEvent};
use chatsphere_core::seed::demo_state;

const NOW: i64 = 1_706_959_800_000;

fn setup_list() -> ChatList {
    ChatList::new(ChatRepository::with_state(ClientConfig::default(), demo_state(NOW)))
}

fn visible_names(list: &ChatList) -> Vec<String> {
    list.visible()
        .expect("visible")
        .into_iter()
        .map(|c| c.name)
        .collect()
}

#[test]
fn work_tab_shows_exactly_tagged_chats() {
    let mut list = setup_list();
    let rx = list.repository().subscribe().expect("subscribe");

    let name = list.create_tab(" Work ", &["1", "2"]).expect("create tab");
    assert_eq!(name, "Work");
    assert_eq!(rx.try_recv(), Ok(RepositoryEvent::TabsChanged));
    assert_eq!(rx.try_recv(), Ok(RepositoryEvent::ConversationsChanged));

    assert_eq!(list.active_filter().expect("active"), Filter::Custom("Work".to_string()));
    assert_eq!(visible_names(&list), vec!["Ayesha", "Anees"]);

    list.set_search("ane");
    assert_eq!(visible_names(&list), vec!["Anees"]);
}

#[test]
fn tag_selection_payload_registers_tab_and_tags_known_names() {
    let mut list = setup_list();
    let applied = list
        .apply_tag_selection("Family Time", r#"["Family", "Usman", "Stranger"]"#)
        .expect("apply");
    assert!(applied);
    assert!(list
        .tabs()
        .expect("tabs")
        .iter()
        .any(|t| t.name == "Family Time"));

    list.select_tab("Family Time").expect("select");
    assert_eq!(visible_names(&list), vec!["Usman", "Family"]);
    assert_eq!(list.visible().expect("visible").len(), 2);

    let again = list
        .apply_tag_selection("Family Time", r#"["Family"]"#)
        .expect("apply");
    assert!(again);
    assert_eq!(list.tabs().expect("tabs").len(), 5);
}

#[test]
fn malformed_payload_is_skipped() {
    let mut list = setup_list();
    let rx = list.repository().subscribe().expect("subscribe");
    for payload in ["not json", r#"{"names": ["Ayesha"]}"#, r#"["Ayesha", 3]"#] {
        assert!(!list.apply_tag_selection("Work", payload).expect("apply"));
    }
    assert!(!list.apply_tag_selection("  ", r#"["Ayesha"]"#).expect("apply"));
    assert!(rx.try_recv().is_err());
    assert_eq!(list.tabs().expect("tabs").len(), 4);
}

#[test]
fn payload_for_builtin_or_add_tab_tags_nothing() {
    let mut list = setup_list();
    let rx = list.repository().subscribe().expect("subscribe");
    for tab in ["All", "Unread", "Groups", "Favorites", "+", " All "] {
        assert!(!list.apply_tag_selection(tab, r#"["Ayesha", "Anees"]"#).expect("apply"));
    }
    assert!(rx.try_recv().is_err());
    assert_eq!(list.tabs().expect("tabs").len(), 4);
    let tagged = list
        .repository()
        .read(|s| s.conversations.list().iter().any(|c| !c.tags.is_empty()))
        .expect("read");
    assert!(!tagged);
}

#[test]
fn tags_survive_rename() {
    let mut list = setup_list();
    list.create_tab("Gym", &["6"]).expect("create");
    list.rename("6", "Fatima K").expect("rename");
    assert_eq!(visible_names(&list), vec!["Fatima K"]);
    assert!(list.rename("6", "Ayesha").is_err());
}
