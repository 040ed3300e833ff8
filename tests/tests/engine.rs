use std::sync::Arc;

use potluck_client::{
    api::{self, CommentId, RecipeId},
    CommentKey, CommentThread, ComposerPhase, ComposerTarget, CredentialStore, Error,
    ExpandedThreads, MemoryCredentials, ThreadState,
};
use potluck_mock_server::{MockServer, MockService};
use rand::SeedableRng;

const RECIPE: RecipeId = RecipeId(1);

struct Harness {
    server: Arc<MockServer>,
    credentials: Arc<MemoryCredentials>,
    thread: CommentThread<MockService>,
    state: ThreadState,
}

impl Harness {
    fn new(logged_in: bool) -> Harness {
        if std::env::var("RUST_LOG").is_ok() {
            let _ = tracing_subscriber::fmt::try_init();
        }
        let server = Arc::new(MockServer::new());
        server.add_recipe(RECIPE);
        let tok = server.add_user("marie");
        let credentials = Arc::new(match logged_in {
            true => MemoryCredentials::new(Some(tok), None),
            false => MemoryCredentials::anonymous(),
        });
        let service = MockService::new(server.clone(), credentials.clone());
        Harness {
            thread: CommentThread::new(service, credentials.clone()),
            server,
            credentials,
            state: ThreadState::default(),
        }
    }

    fn seed(&self, id: i64, parent: Option<i64>, created_at: &str) {
        self.server.insert_comment(
            RECIPE,
            api::Comment {
                id: CommentId(id),
                recipe_id: Some(RECIPE),
                content: format!("comment {id}"),
                created_at: String::from(created_at),
                parent_id: parent.map(CommentId),
                user_id: None,
                username: Some(String::from("tomas")),
            },
        );
    }

    fn pending_count(&self) -> usize {
        self.thread
            .comments()
            .iter()
            .filter(|c| c.is_pending())
            .count()
    }
}

#[tokio::test]
async fn load_builds_threads_and_drops_dangling_replies() {
    let mut h = Harness::new(true);
    h.seed(3, Some(1), "2025-08-13T10:03:00");
    h.seed(1, None, "2025-08-13T10:01:00");
    h.seed(2, Some(99), "2025-08-13T10:02:00");
    h.seed(4, None, "2025-08-13T10:00:00");
    assert_eq!(h.thread.load(RECIPE).await.len(), 4);

    let forest = h.thread.forest();
    let roots = forest.iter().map(|n| n.comment.key()).collect::<Vec<_>>();
    assert_eq!(
        roots,
        vec![CommentKey::from(CommentId(4)), CommentKey::from(CommentId(1))]
    );
    assert_eq!(forest[1].children.len(), 1);
    assert!(forest
        .iter()
        .flat_map(|n| potluck_client::flatten_replies(n))
        .all(|r| r.comment.key() != CommentKey::from(CommentId(2))));
    assert_eq!(h.thread.forest(), forest);
}

#[tokio::test]
async fn load_failure_shows_empty_list() {
    let mut h = Harness::new(true);
    h.seed(1, None, "2025-08-13T10:01:00");
    h.server.set_offline(true);
    assert!(h.thread.load(RECIPE).await.is_empty());
    assert!(h.thread.load(RecipeId(404)).await.is_empty());
}

#[tokio::test]
async fn failed_post_is_rolled_back() {
    let mut h = Harness::new(true);
    h.thread.load(RECIPE).await;
    h.server.set_offline(true);
    let res = h.thread.post(&mut h.state, RECIPE, "hello", None).await;
    assert_eq!(
        res,
        Err(Error::Network(String::from("Could not reach the server")))
    );
    assert_eq!(res.unwrap_err().signal(), "network-failure");
    assert_eq!(h.pending_count(), 0);
    assert_eq!(h.state.composers.draft(ComposerTarget::Root), "hello");
    assert!(h.server.test_comments(RECIPE).is_empty());
}

#[tokio::test]
async fn successful_post_replaces_pending_comment() {
    let mut h = Harness::new(true);
    h.seed(500, None, "2025-08-13T10:00:00");
    h.thread.load(RECIPE).await;
    let posted = h
        .thread
        .post(&mut h.state, RECIPE, "hello", None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(posted.id, CommentId(501));
    let hellos = h
        .thread
        .comments()
        .iter()
        .filter(|c| c.content() == "hello")
        .map(|c| c.key())
        .collect::<Vec<_>>();
    assert_eq!(hellos, vec![CommentKey::from(CommentId(501))]);
    assert_eq!(h.pending_count(), 0);
    assert_eq!(
        h.state.composers.phase(ComposerTarget::Root),
        ComposerPhase::Idle
    );
    assert_eq!(h.server.test_comments(RECIPE).len(), 2);
}

#[tokio::test]
async fn no_session_means_no_request() {
    let mut h = Harness::new(false);
    h.seed(1, None, "2025-08-13T10:00:00");
    h.thread.load(RECIPE).await;
    let requests = h.server.test_num_requests();
    let res = h.thread.post(&mut h.state, RECIPE, "hello", None).await;
    assert_eq!(res, Err(Error::Unauthenticated));
    assert_eq!(res.unwrap_err().signal(), "unauthenticated");
    assert_eq!(h.server.test_num_requests(), requests);
    assert_eq!(h.thread.comments().len(), 1);
}

#[tokio::test]
async fn blank_post_is_a_no_op() {
    let mut h = Harness::new(true);
    h.thread.load(RECIPE).await;
    let requests = h.server.test_num_requests();
    h.state
        .composers
        .set_draft(ComposerTarget::Root, String::from("   "));
    let res = h.thread.post(&mut h.state, RECIPE, "   ", None).await;
    assert_eq!(res, Ok(None));
    assert_eq!(h.server.test_num_requests(), requests);
    assert!(h.thread.comments().is_empty());
    assert_eq!(h.state.composers.draft(ComposerTarget::Root), "   ");
}

#[tokio::test]
async fn reply_expands_its_thread() {
    let mut h = Harness::new(true);
    h.seed(1, None, "2025-08-13T10:00:00");
    h.seed(2, Some(1), "2025-08-13T10:01:00");
    h.seed(3, Some(1), "2025-08-13T10:02:00");
    h.seed(4, Some(2), "2025-08-13T10:03:00");
    h.thread.load(RECIPE).await;

    let views = h.thread.views(&h.state.expanded);
    assert_eq!(views[0].visible_replies.len(), 2);
    assert_eq!(views[0].hidden_count, 1);

    h.state.composers.open_reply(CommentId(4));
    let reply = h
        .thread
        .post(&mut h.state, RECIPE, " same here ", Some(CommentId(4)))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reply.content, "same here");
    assert_eq!(reply.parent_id, Some(CommentId(4)));
    assert_eq!(h.state.composers.open_reply_target(), None);
    assert!(h.state.expanded.is_expanded(&CommentId(1).into()));

    let views = h.thread.views(&h.state.expanded);
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].hidden_count, 0);
    let order = views[0]
        .visible_replies
        .iter()
        .map(|r| r.comment.key())
        .collect::<Vec<_>>();
    assert_eq!(
        order,
        vec![
            CommentKey::from(CommentId(2)),
            CommentKey::from(CommentId(4)),
            CommentKey::from(reply.id),
            CommentKey::from(CommentId(3)),
        ]
    );
    let posted = views[0].visible_replies[2];
    assert_eq!(posted.parent.key(), CommentKey::from(CommentId(4)));
    assert_eq!(posted.comment.author_name(), "marie");
}

#[tokio::test]
async fn failed_reply_restores_its_composer() {
    let mut h = Harness::new(true);
    h.seed(1, None, "2025-08-13T10:00:00");
    h.thread.load(RECIPE).await;
    let target = ComposerTarget::Reply(CommentId(1));
    h.state.composers.open_reply(CommentId(1));
    h.server.fail_next_requests(1);
    let res = h
        .thread
        .post(&mut h.state, RECIPE, "  yes!  ", Some(CommentId(1)))
        .await;
    assert!(res.is_err());
    assert_eq!(h.state.composers.draft(target), "yes!");
    assert_eq!(h.state.composers.open_reply_target(), Some(CommentId(1)));
    assert_eq!(h.state.composers.draft(ComposerTarget::Root), "");
    assert_eq!(h.pending_count(), 0);
}

#[tokio::test]
async fn rejected_session_rolls_back() {
    let mut h = Harness::new(true);
    h.thread.load(RECIPE).await;
    let tok = h.credentials.access_token().unwrap();
    h.server.revoke(&tok);
    let res = h.thread.post(&mut h.state, RECIPE, "hello", None).await;
    assert_eq!(res, Err(Error::Api(api::Error::Unauthorized)));
    assert_eq!(res.unwrap_err().signal(), "unauthenticated");
    assert_eq!(h.pending_count(), 0);
    assert_eq!(h.state.composers.draft(ComposerTarget::Root), "hello");
}

#[tokio::test]
async fn interleaved_submissions_settle_independently() {
    let mut h = Harness::new(true);
    h.seed(1, None, "2025-08-13T10:00:00");
    h.thread.load(RECIPE).await;

    let root = h
        .thread
        .begin_post(&mut h.state, RECIPE, "first", None)
        .unwrap()
        .unwrap();
    let reply = h
        .thread
        .begin_post(&mut h.state, RECIPE, "second", Some(CommentId(1)))
        .unwrap()
        .unwrap();
    assert_eq!(h.pending_count(), 2);
    assert_eq!(
        h.state.composers.phase(ComposerTarget::Root),
        ComposerPhase::Submitting
    );

    let (root_res, reply_res) = {
        let service = h.thread.service();
        futures::join!(
            potluck_client::CommentService::create(service, root.recipe(), root.comment()),
            potluck_client::CommentService::create(service, reply.recipe(), reply.comment()),
        )
    };

    // Settling the first submission clears every optimistic entry
    h.thread.finish_post(&mut h.state, root, root_res).unwrap();
    assert_eq!(h.pending_count(), 0);
    h.thread.finish_post(&mut h.state, reply, reply_res).unwrap();

    let contents = h
        .thread
        .comments()
        .iter()
        .map(|c| c.content().to_string())
        .collect::<Vec<_>>();
    assert_eq!(contents, vec!["comment 1", "first", "second"]);
    assert_eq!(
        h.state.composers.phase(ComposerTarget::Reply(CommentId(1))),
        ComposerPhase::Idle
    );
}

#[tokio::test]
async fn generated_fixture_loads_fully() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    let comments = tests::gen_comments(&mut rng, RECIPE, 40);
    let mut h = Harness::new(true);
    for c in comments {
        h.server.insert_comment(RECIPE, c);
    }
    h.thread.load(RECIPE).await;

    let mut expanded = ExpandedThreads::new();
    for root in h.thread.forest() {
        expanded.expand(root.comment.key());
    }
    let shown = h
        .thread
        .views(&expanded)
        .iter()
        .map(|v| 1 + v.visible_replies.len())
        .sum::<usize>();
    assert_eq!(shown, 40);

    let collapsed = h.thread.views(&ExpandedThreads::new());
    assert!(collapsed.iter().all(|v| v.visible_replies.len() <= 2));
    assert_eq!(
        collapsed.iter().map(|v| 1 + v.reply_count()).sum::<usize>(),
        40
    );
}
