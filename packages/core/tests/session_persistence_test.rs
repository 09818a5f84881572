//! Session Persistence Tests
//!
//! Save and restore whole maps through the flat-file store.

#[cfg(test)]
mod session_persistence_tests {
    use anyhow::Result;
    use mindgraph_core::providers::fixed::{
        FixedConcepts, FixedEnrichment, FixedTitles, ScriptedProposer,
    };
    use mindgraph_core::providers::{ChatReply, ConceptDraft};
    use mindgraph_core::{
        ChatRole, Collaborators, EngineConfig, JsonFileSessionStore, MutationOrchestrator,
        SessionStore, SessionStoreConfig,
    };
    use std::sync::Arc;
    use tempfile::TempDir;

    fn create_test_store() -> Result<(JsonFileSessionStore, TempDir)> {
        let temp_dir = TempDir::new()?;
        let config = SessionStoreConfig::at(temp_dir.path().join("sessions.json"));
        let store = JsonFileSessionStore::from_config(&config)?;
        Ok((store, temp_dir))
    }

    fn build() -> Result<MutationOrchestrator> {
        let collaborators = Collaborators {
            titles: Arc::new(FixedTitles::returning("Photosynthesis")),
            concepts: Arc::new(FixedConcepts::new(vec![
                ConceptDraft::new("Light Reactions", "Thylakoid membrane"),
                ConceptDraft::new("Calvin Cycle", "Carbon fixation"),
                ConceptDraft::new("Chlorophyll", "Pigment"),
                ConceptDraft::new("Stomata", "Gas exchange"),
            ])),
            proposer: Arc::new(ScriptedProposer::new(vec![ChatReply::text_only(
                "Plants turn light into sugar.",
            )])),
            enrichment: Arc::new(FixedEnrichment::new()),
        };
        Ok(MutationOrchestrator::new(
            EngineConfig::default(),
            collaborators,
        )?)
    }

    #[tokio::test]
    async fn test_save_restore_round_trip_through_file() -> Result<()> {
        let (sessions, _temp_dir) = create_test_store()?;
        let orchestrator = build()?;

        let root_id = orchestrator.submit_topic("how do plants eat").await?;
        orchestrator.expand_node(&root_id).await?;
        orchestrator.chat_turn("tell me the basics").await?;
        let saved = orchestrator.save_session(&sessions, "Photosynthesis").await?;

        // A fresh orchestrator restores the same picture
        let restored = build()?;
        restored.load_session(&sessions, &saved.id).await?;

        let original = orchestrator.snapshot();
        let loaded = restored.snapshot();
        assert_eq!(loaded.nodes, original.nodes);
        assert_eq!(loaded.edges, original.edges);
        assert_eq!(restored.session_id(), Some(saved.id.clone()));

        let roles: Vec<ChatRole> = restored.transcript().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![ChatRole::Model, ChatRole::User, ChatRole::Model]);

        Ok(())
    }

    #[tokio::test]
    async fn test_resave_updates_in_place() -> Result<()> {
        let (sessions, _temp_dir) = create_test_store()?;
        let orchestrator = build()?;

        let root_id = orchestrator.submit_topic("plants").await?;
        let first = orchestrator.save_session(&sessions, "Draft").await?;

        orchestrator.expand_node(&root_id).await?;
        let second = orchestrator.save_session(&sessions, "Final").await?;

        assert_eq!(first.id, second.id);
        assert_eq!(first.created_at, second.created_at);
        assert!(second.updated_at >= first.updated_at);

        let listed = sessions.list().await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Final");

        let stored = sessions.get(&first.id).await?.expect("session stored");
        assert_eq!(stored.nodes.len(), 5);

        Ok(())
    }

    #[tokio::test]
    async fn test_new_topic_saves_as_new_session() -> Result<()> {
        let (sessions, _temp_dir) = create_test_store()?;
        let orchestrator = build()?;

        orchestrator.submit_topic("plants").await?;
        let first = orchestrator.save_session(&sessions, "Plants").await?;

        orchestrator.submit_topic("more plants").await?;
        assert_eq!(orchestrator.session_id(), None);
        let second = orchestrator.save_session(&sessions, "More plants").await?;

        assert_ne!(first.id, second.id);
        let ids: Vec<String> = sessions.list().await?.into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);

        Ok(())
    }

    #[tokio::test]
    async fn test_corrupt_file_restores_empty() -> Result<()> {
        let (sessions, _temp_dir) = create_test_store()?;
        std::fs::write(sessions.path(), "[{\"id\": 1}]")?;

        let orchestrator = build()?;
        orchestrator.submit_topic("plants").await?;

        assert!(orchestrator.load_session(&sessions, "any").await.is_err());
        assert!(orchestrator.snapshot().is_empty());

        Ok(())
    }
}
