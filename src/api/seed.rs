//! Built-in catalog used when no catalog file is configured.

use chrono::{DateTime, TimeZone, Utc};

use super::types::{Comment, CommentAuthor, Meme, User};

const PLACEHOLDER_IMAGE: &str = "/placeholder.svg?height=600&width=600";
const PLACEHOLDER_AVATAR: &str = "/placeholder.svg?height=40&width=40";

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

fn author(name: &str, username: &str) -> CommentAuthor {
    CommentAuthor {
        name: name.to_string(),
        username: username.to_string(),
        avatar: PLACEHOLDER_AVATAR.to_string(),
    }
}

struct Creator {
    id: &'static str,
    name: &'static str,
    username: &'static str,
    bio: &'static str,
    followers: u64,
    following: u64,
    meme_count: u64,
    total_likes: u64,
    badge: &'static str,
}

const CREATORS: [Creator; 4] = [
    Creator {
        id: "user1",
        name: "CodeMaster",
        username: "codemaster",
        bio: "Full-stack developer by day, meme creator by night",
        followers: 5432,
        following: 321,
        meme_count: 98,
        total_likes: 12543,
        badge: "Meme Lord",
    },
    Creator {
        id: "user2",
        name: "CatLover",
        username: "catlover",
        bio: "Just here for the cat memes",
        followers: 8765,
        following: 432,
        meme_count: 154,
        total_likes: 9876,
        badge: "Cat Whisperer",
    },
    Creator {
        id: "user3",
        name: "MondayHater",
        username: "mondayhater",
        bio: "Professional procrastinator",
        followers: 2310,
        following: 118,
        meme_count: 61,
        total_likes: 6420,
        badge: "Weekend Warrior",
    },
    Creator {
        id: "user4",
        name: "PixelPusher",
        username: "pixelpusher",
        bio: "Designer. Kerning enthusiast.",
        followers: 1984,
        following: 250,
        meme_count: 42,
        total_likes: 3310,
        badge: "Rising Star",
    },
];

fn creator(idx: usize) -> User {
    let c = &CREATORS[idx % CREATORS.len()];
    User {
        id: c.id.to_string(),
        name: c.name.to_string(),
        username: c.username.to_string(),
        avatar: PLACEHOLDER_AVATAR.to_string(),
        bio: Some(c.bio.to_string()),
        followers: c.followers,
        following: c.following,
        meme_count: c.meme_count,
        total_likes: Some(c.total_likes),
        badge: Some(c.badge.to_string()),
    }
}

/// Leaderboard users, best first.
pub fn seed_users() -> Vec<User> {
    (0..CREATORS.len()).map(creator).collect()
}

/// The default meme catalog.
pub fn seed_memes() -> Vec<Meme> {
    // (title, creator, likes, comment_count, created_at, tags)
    let rows: [(&str, usize, u64, u64, DateTime<Utc>, &[&str]); 12] = [
        (
            "When the code finally works after 5 hours of debugging",
            0,
            1542,
            87,
            at(2023, 5, 15, 14, 23),
            &["programming", "debugging", "developer", "coding"],
        ),
        ("Cat memes never get old", 1, 2341, 156, at(2023, 5, 14, 9, 12), &["cats", "funny", "animals", "cute"]),
        ("Monday morning mood", 2, 987, 45, at(2023, 5, 13, 8, 0), &["monday", "work", "mood"]),
        ("It works on my machine", 0, 1876, 203, at(2023, 5, 12, 17, 40), &["programming", "devops", "developer"]),
        ("When the designer asks for one more pixel", 3, 654, 32, at(2023, 5, 11, 11, 5), &["design", "work", "funny"]),
        ("Cat.exe has stopped working", 1, 3012, 98, at(2023, 5, 10, 20, 15), &["cats", "programming", "funny"]),
        ("The weekend went by in 5 minutes", 2, 1203, 64, at(2023, 5, 9, 22, 30), &["weekend", "mood", "relatable"]),
        ("Reading the docs after trying everything else", 0, 845, 51, at(2023, 5, 8, 13, 45), &["programming", "docs", "coding"]),
        ("My cat judging my life choices", 1, 1999, 120, at(2023, 5, 7, 19, 0), &["cats", "animals", "relatable"]),
        ("Deadline is tomorrow and I haven't started", 2, 1432, 77, at(2023, 5, 6, 23, 55), &["work", "deadline", "relatable"]),
        ("Comic Sans in production", 3, 512, 140, at(2023, 5, 5, 10, 10), &["design", "fonts", "funny"]),
        ("Git push --force on a Friday", 0, 2210, 189, at(2023, 5, 4, 16, 20), &["programming", "git", "developer"]),
    ];

    rows.into_iter()
        .enumerate()
        .map(|(i, (title, who, likes, comment_count, created_at, tags))| Meme {
            id: (i + 1).to_string(),
            title: title.to_string(),
            description: None,
            image_url: PLACEHOLDER_IMAGE.to_string(),
            likes,
            comment_count,
            user: creator(who),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            created_at,
            comments: seed_comments(i),
        })
        .collect()
}

fn seed_comments(idx: usize) -> Vec<Comment> {
    match idx {
        0 => vec![
            Comment {
                id: "c1".to_string(),
                user: author("DevFunny", "devfunny"),
                content: "This is literally me every single day".to_string(),
                created_at: at(2023, 5, 15, 15, 30),
                likes: 42,
                replies: vec![Comment {
                    id: "r1".to_string(),
                    user: author("CodeMaster", "codemaster"),
                    content: "The struggle is real!".to_string(),
                    created_at: at(2023, 5, 15, 16, 5),
                    likes: 12,
                    replies: Vec::new(),
                }],
            },
            Comment {
                id: "c2".to_string(),
                user: author("BugHunter", "bughunter"),
                content: "And then you realize it was just a missing semicolon...".to_string(),
                created_at: at(2023, 5, 15, 17, 45),
                likes: 78,
                replies: Vec::new(),
            },
        ],
        1 => vec![Comment {
            id: "c3".to_string(),
            user: author("DogPerson", "dogperson"),
            content: "I'm more of a dog person, but this is hilarious!".to_string(),
            created_at: at(2023, 5, 14, 10, 30),
            likes: 23,
            replies: Vec::new(),
        }],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_ids_are_unique() {
        let memes = seed_memes();
        let ids: HashSet<&str> = memes.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids.len(), memes.len());
    }

    #[test]
    fn test_seed_users_have_badges() {
        assert!(seed_users().iter().all(|u| u.badge.is_some()));
    }
}
