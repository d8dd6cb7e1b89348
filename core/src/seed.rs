use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveTime, Utc};

use crate::calls::CallLog;
use crate::communities::CommunityStore;
use crate::conversations::ConversationStore;
use crate::models::{
    CallDirection, CallKind, CallLogEntry, Community, Conversation, DeliveryStatus, Message, MessageBody, Sender,
    StatusUpdate,
};
use crate::messages::MessageThread;
use crate::repository::RepositoryState;
use crate::status::StatusBoard;

const AYESHA: &str = "https://wallpapers.com/images/hd/pretty-snow-white-n9otqz6ijd2ze1mo.jpg";
const ANEES: &str = "https://i.ibb.co/CK1J1Jjh/IMG-20250408-WA0024.jpg";
const FATIMA: &str = "https://i.pinimg.com/736x/72/9c/9d/729c9de0a72d86ec4490de02099ea827.jpg";
const USMAN: &str = "https://randomuser.me/api/portraits/men/7.jpg";
const ALI: &str = "https://randomuser.me/api/portraits/men/12.jpg";

/// Everything the demo client shows on first launch.
pub struct DemoData {
    pub state: RepositoryState,
    pub communities: CommunityStore,
    pub calls: CallLog,
    pub statuses: StatusBoard,
}

pub fn seed_demo(now: i64) -> DemoData {
    DemoData {
        state: demo_state(now),
        communities: demo_communities(),
        calls: demo_calls(now),
        statuses: demo_statuses(now),
    }
}

/// `hour:minute` on the day `days_ago` before `now`, in Unix millis.
fn at(now: i64, days_ago: i64, hour: u32, minute: u32) -> i64 {
    let day = DateTime::<Utc>::from_timestamp_millis(now)
        .unwrap_or_default()
        .date_naive()
        - Duration::days(days_ago);
    let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default();
    day.and_time(time).and_utc().timestamp_millis()
}

/// Chat list plus a short opening exchange in every thread.
pub fn demo_state(now: i64) -> RepositoryState {
    let chats: [(&str, &str, &str, i64, u32, bool, bool, &str); 10] = [
        ("1", "Ayesha", "Kal milte hain!", at(now, 0, 11, 30), 2, true, false, AYESHA),
        ("2", "Anees", "Meeting confirm ho gayi hai.", at(now, 0, 10, 12), 0, false, false, "https://i.pinimg.com/236x/5d/8e/6c/5d8e6c121b9ac308a6f6b5c5b722109d.jpg"),
        ("3", "Zuniar", "Theek hai, done!", at(now, 0, 9, 45), 1, false, false, "https://randomuser.me/api/portraits/women/3.jpg"),
        ("4", "Noman", "PDF bhej dia hai.", at(now, 1, 18, 0), 0, false, false, "https://randomuser.me/api/portraits/men/4.jpg"),
        ("5", "Samar", "Nice work 👍", at(now, 0, 14, 0), 3, false, false, "https://encrypted-tbn0.gstatic.com/images?q=tbn:ANd9GcQtbJnTwQF5UdIZmpRv1pWbjkng2CJkR0xw1g&s"),
        ("6", "Fatima", "Okay, noted!", at(now, 0, 8, 0), 0, false, false, FATIMA),
        ("7", "Usman", "Let's catch up soon.", at(now, 0, 15, 15), 0, false, false, USMAN),
        ("8", "Chachu Group", "Picnic plan confirm hai 🚗", at(now, 0, 13, 22), 2, false, true, "https://cdn-icons-png.flaticon.com/512/3062/3062634.png"),
        ("9", "Batija Group", "Game night kab?", at(now, 0, 16, 5), 4, false, true, "https://cdn-icons-png.flaticon.com/512/1184/1184121.png"),
        ("10", "Family", "Dinner ready hai 😋", at(now, 0, 9, 55), 3, false, true, "https://cdn-icons-png.flaticon.com/512/847/847969.png"),
    ];

    let conversations = chats
        .iter()
        .map(|&(id, name, preview, ts, unread, favorite, group, avatar)| Conversation {
            id: id.to_string(),
            name: name.to_string(),
            contact_key: None,
            last_message_preview: preview.to_string(),
            last_activity_at: ts,
            unread_count: unread,
            is_favorite: favorite,
            is_pinned: false,
            is_group: group,
            tags: BTreeSet::new(),
            avatar_ref: avatar.to_string(),
        })
        .collect();

    let mut state = RepositoryState::new(ConversationStore::from_conversations(conversations));
    for (id, ..) in chats.iter() {
        state.insert_thread(demo_thread(id, now));
    }
    state
}

pub fn demo_thread(conversation_id: &str, now: i64) -> MessageThread {
    let message = |id: &str, text: &str, minute: u32, sender: Sender| Message {
        id: id.to_string(),
        body: MessageBody::text(text),
        sent_at: at(now, 0, 11, minute),
        sender,
        status: (sender == Sender::SelfUser).then_some(DeliveryStatus::Sent),
        pinned: false,
        reply_to_body: None,
    };
    MessageThread::with_messages(
        conversation_id,
        vec![
            message("1", "Hi!", 30, Sender::Other),
            message("2", "Hello! Kya haal hai?", 31, Sender::SelfUser),
            message("3", "Sab theek, tum sunao?", 32, Sender::Other),
        ],
    )
}

pub fn demo_communities() -> CommunityStore {
    let rows: [(&str, u32, &str, u32, &str); 7] = [
        ("Tech Enthusiasts", 120, "New meetup scheduled!", 3, "https://cdn-icons-png.flaticon.com/512/3595/3595455.png"),
        ("Designers Hub", 80, "Logo review tonight 🎨", 1, "https://cdn-icons-png.flaticon.com/512/4326/4326001.png"),
        ("Fitness Squad", 45, "Morning yoga at 6am", 0, "https://cdn-icons-png.flaticon.com/512/3198/3198701.png"),
        ("Gaming Arena", 200, "PUBG room open!", 0, "https://cdn-icons-png.flaticon.com/512/2936/2936885.png"),
        ("Movie Lovers", 65, "New trailer drop 🍿", 0, "https://cdn-icons-png.flaticon.com/512/2922/2922676.png"),
        ("Crypto Champs", 300, "BTC to the moon 🌙", 0, "https://cdn-icons-png.flaticon.com/512/5548/5548282.png"),
        ("College Friends", 35, "Trip planning again", 0, "https://cdn-icons-png.flaticon.com/512/1077/1077012.png"),
    ];
    CommunityStore::new(
        rows.iter()
            .enumerate()
            .map(|(idx, &(name, members, recent, unread, avatar))| Community {
                id: (idx + 1).to_string(),
                name: name.to_string(),
                members,
                recent: recent.to_string(),
                unread,
                avatar: avatar.to_string(),
            })
            .collect(),
    )
}

/// The four sample calls repeated to fill the log.
pub fn demo_calls(now: i64) -> CallLog {
    let base = [
        ("Ayesha", AYESHA, CallDirection::Incoming, CallKind::Voice, at(now, 0, 14, 30)),
        ("Ali", ALI, CallDirection::Missed, CallKind::Voice, at(now, 1, 17, 15)),
        ("Fatima", FATIMA, CallDirection::Outgoing, CallKind::Video, at(now, 1, 20, 0)),
        ("Usman", USMAN, CallDirection::Missed, CallKind::Video, at(now, 0, 11, 0)),
    ];
    CallLog::new(
        base.iter()
            .cycle()
            .take(base.len() * 8)
            .enumerate()
            .map(|(idx, &(name, avatar, direction, kind, ts))| CallLogEntry {
                id: (idx + 1).to_string(),
                name: name.to_string(),
                avatar: avatar.to_string(),
                direction,
                kind,
                at: ts,
            })
            .collect(),
    )
}

pub fn demo_statuses(now: i64) -> StatusBoard {
    let minute = 60_000;
    let rows = [
        ("1", "Ayesha", AYESHA, "https://www.w3schools.com/html/mov_bbb.mp4", now, false),
        ("2", "Anees", ANEES, "https://samplelib.com/lib/preview/mp4/sample-5s.mp4", now - 5 * minute, false),
        ("3", "Fatima", FATIMA, "https://filesamples.com/samples/video/mp4/sample_640x360.mp4", at(now, 0, 9, 0), true),
        ("4", "Usman", USMAN, "https://placekitten.com/603/603", at(now, 1, 12, 0), true),
    ];
    StatusBoard::new(
        rows.iter()
            .map(|&(id, name, avatar, media, posted_at, seen)| StatusUpdate {
                id: id.to_string(),
                name: name.to_string(),
                avatar: avatar.to_string(),
                media_uri: media.to_string(),
                posted_at,
                seen,
            })
            .collect(),
    )
}
