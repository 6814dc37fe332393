//! End-to-end flows against the in-memory server

use pantry_common::cross_ref::StockCoordinator;
use pantry_common::error::{ApiError, PantryError};
use pantry_common::fake_api::{Endpoint, FakePantryApi};
use pantry_common::impact::AbortReason;
use pantry_common::inventory::InventoryManager;
use pantry_common::models::{
    Amount, CatalogEntry, CatalogWrite, Category, Classification, InventoryUpdate, RecipePayload,
};
use pantry_common::prompt::{AssumeYes, Confirmation, ScriptedPrompter};
use pantry_common::reconcile::{CatalogController, CatalogDraft, SaveOutcome, SaveState};
use pantry_common::resolver::{RecipeDraft, RecipeSaveOutcome, RecipeSaveState, RecipeSaver};
use pantry_common::store::{PantryStore, Scope};
use pantry_common::PantryApi;
use std::sync::Arc;

const SAUCE_RECIPE: &str = "Onion,1,diced\n=Sauce=\nSoy Sauce,2tbsp,";

fn tomato_edit(api: &FakePantryApi) -> CatalogDraft {
    let mut draft = CatalogDraft::edit(api.catalog_by_name("Tomato").unwrap());
    draft.edited.name = "Tomatoes".into();
    draft.edited.default_unit = "kg".into();
    draft
}

fn seed_tomato(api: &FakePantryApi) -> i64 {
    let tomato = api.seed_catalog("Tomato", Classification::Ingredient, "pcs");
    api.seed_recipe("Salad", "Tomato,2");
    api.seed_recipe("Pasta", "Tomato,3");
    tomato
}

// ============================================================================
// Catalog edit gate
// ============================================================================

#[tokio::test]
async fn test_rename_and_unit_prompts_in_order_decline_unit() {
    let api = Arc::new(FakePantryApi::new());
    seed_tomato(&api);
    let prompter = Arc::new(ScriptedPrompter::answering(&[true, false]));
    let controller = CatalogController::new(api.clone(), prompter.clone());
    let mut store = PantryStore::new();

    let report = controller.save(&mut store, &tomato_edit(&api)).await.unwrap();

    assert_eq!(prompter.asked_kinds(), vec!["rename_impact", "unit_drift"]);
    assert_eq!(report.outcome, SaveOutcome::Aborted(AbortReason::UnitChangeDeclined));
    assert_eq!(api.write_count(), 0);
    assert!(api.catalog_by_name("Tomato").is_some());
}

#[tokio::test]
async fn test_rename_declined_skips_unit_prompt() {
    let api = Arc::new(FakePantryApi::new());
    seed_tomato(&api);
    let prompter = Arc::new(ScriptedPrompter::answering(&[false]));
    let controller = CatalogController::new(api.clone(), prompter.clone());
    let mut store = PantryStore::new();

    let report = controller.save(&mut store, &tomato_edit(&api)).await.unwrap();

    assert_eq!(prompter.asked_kinds(), vec!["rename_impact"]);
    match &prompter.asked()[0] {
        Confirmation::RenameImpact { recipe_count, .. } => assert_eq!(*recipe_count, 2),
        other => panic!("unexpected prompt: {:?}", other),
    }
    assert_eq!(report.outcome, SaveOutcome::Aborted(AbortReason::RenameDeclined));
    assert_eq!(api.write_count(), 0);
}

#[tokio::test]
async fn test_rename_confirmed_updates_in_place() {
    let api = Arc::new(FakePantryApi::new());
    let tomato = seed_tomato(&api);
    let prompter = Arc::new(ScriptedPrompter::answering(&[true, true]));
    let controller = CatalogController::new(api.clone(), prompter);
    let mut store = PantryStore::new();

    let report = controller.save(&mut store, &tomato_edit(&api)).await.unwrap();

    assert_eq!(report.outcome, SaveOutcome::Saved);
    let renamed = api.catalog_by_name("Tomatoes").unwrap();
    assert_eq!(renamed.id, tomato);
    assert_eq!(renamed.default_unit, "kg");
    assert_eq!(store.catalog_entry(tomato).map(|e| e.name.as_str()), Some("Tomatoes"));
}

#[tokio::test]
async fn test_usage_failure_does_not_block_save() {
    let api = Arc::new(FakePantryApi::new());
    seed_tomato(&api);
    api.fail_next(Endpoint::CatalogUsage, ApiError::Transport("timeout".into()));
    let prompter = Arc::new(ScriptedPrompter::answering(&[true]));
    let controller = CatalogController::new(api.clone(), prompter.clone());
    let mut store = PantryStore::new();

    let report = controller.save(&mut store, &tomato_edit(&api)).await.unwrap();

    assert_eq!(prompter.asked_kinds(), vec!["unit_drift"]);
    assert_eq!(report.outcome, SaveOutcome::Saved);
}

// ============================================================================
// Merge on conflict
// ============================================================================

#[tokio::test]
async fn test_salt_conflict_force_merge_repoints_dependents() {
    let api = Arc::new(FakePantryApi::new());
    let salt = api.seed_catalog("Salt", Classification::Seasoning, "");
    let coarse = api.seed_catalog("Coarse Salt", Classification::Seasoning, "g");
    api.seed_inventory(coarse, Amount::Quantity(200.0), "Pantry");
    let soup = api.seed_recipe("Soup", "Coarse Salt,1tsp");

    let prompter = Arc::new(ScriptedPrompter::answering(&[true, true, true]));
    let controller = CatalogController::new(api.clone(), prompter.clone());
    let mut store = PantryStore::new();

    let mut draft = CatalogDraft::edit(api.catalog_by_name("Coarse Salt").unwrap());
    draft.edited.name = "Salt".into();
    draft.edited.default_unit = String::new();

    let report = controller.save(&mut store, &draft).await.unwrap();

    assert_eq!(report.outcome, SaveOutcome::ForceSaved);
    assert_eq!(
        prompter.asked_kinds(),
        vec!["rename_impact", "unit_drift", "merge"]
    );
    assert!(matches!(report.trail.last(), Some(SaveState::ForceSaved)));

    let puts = api.calls_to(Endpoint::UpdateCatalog);
    assert_eq!(puts.len(), 2);
    let mut first = puts[0].body.clone();
    let mut second = puts[1].body.clone();
    assert_eq!(first["force_merge"], serde_json::json!(false));
    assert_eq!(second["force_merge"], serde_json::json!(true));
    first.as_object_mut().unwrap().remove("force_merge");
    second.as_object_mut().unwrap().remove("force_merge");
    assert_eq!(first, second);

    assert_eq!(api.catalog().len(), 1);
    assert_eq!(api.inventory()[0].catalog_id, salt);
    assert_eq!(api.recipe_catalog_ids(soup), vec![salt]);
    assert_eq!(store.inventory()[0].catalog_id, salt);
}

#[tokio::test]
async fn test_new_duplicate_declined_sends_nothing_more() {
    let api = Arc::new(FakePantryApi::new());
    api.seed_catalog("Salt", Classification::Seasoning, "");
    let prompter = Arc::new(ScriptedPrompter::answering(&[false]));
    let controller = CatalogController::new(api.clone(), prompter.clone());
    let mut store = PantryStore::new();

    let draft = CatalogDraft::create(CatalogEntry::new("Salt", Classification::Seasoning));
    let report = controller.save(&mut store, &draft).await.unwrap();

    assert_eq!(report.outcome, SaveOutcome::Aborted(AbortReason::MergeDeclined));
    assert_eq!(api.write_count(), 1);
    match &prompter.asked()[0] {
        Confirmation::Merge { message } => assert!(message.contains("Salt")),
        other => panic!("unexpected prompt: {:?}", other),
    }
}

#[tokio::test]
async fn test_new_duplicate_confirmed_resends_once_with_force_merge() {
    let api = Arc::new(FakePantryApi::new());
    let salt = api.seed_catalog("Salt", Classification::Seasoning, "");
    let prompter = Arc::new(ScriptedPrompter::answering(&[true]));
    let controller = CatalogController::new(api.clone(), prompter.clone());
    let mut store = PantryStore::new();

    let draft = CatalogDraft::create(CatalogEntry::new("Salt", Classification::Seasoning));
    let report = controller.save(&mut store, &draft).await.unwrap();

    assert_eq!(report.outcome, SaveOutcome::ForceSaved);
    assert_eq!(prompter.asked_kinds(), vec!["merge"]);
    assert_eq!(api.write_count(), 2);

    let posts = api.calls_to(Endpoint::CreateCatalog);
    let puts = api.calls_to(Endpoint::UpdateCatalog);
    assert_eq!(posts.len(), 1);
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0].body["force_merge"], serde_json::json!(true));
    let mut forced = puts[0].body.clone();
    forced.as_object_mut().unwrap().remove("force_merge");
    assert_eq!(forced, posts[0].body);

    let catalog = api.catalog();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].id, salt);
}

#[tokio::test]
async fn test_unit_edit_keeps_unlisted_category() {
    let api = Arc::new(FakePantryApi::new());
    api.import_catalog_csv("Apple,ingredient,fruit,pcs,\n").await.unwrap();
    let controller = CatalogController::new(api.clone(), Arc::new(AssumeYes));
    let mut store = PantryStore::new();

    let mut draft = CatalogDraft::edit(api.catalog_by_name("Apple").unwrap());
    draft.edited.default_unit = "kg".into();
    let report = controller.save(&mut store, &draft).await.unwrap();

    assert_eq!(report.outcome, SaveOutcome::Saved);
    let puts = api.calls_to(Endpoint::UpdateCatalog);
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0].body["category"], serde_json::json!("fruit"));
    assert_eq!(puts[0].body["default_unit"], serde_json::json!("kg"));
    let apple = api.catalog_by_name("Apple").unwrap();
    assert_eq!(apple.category, Some(Category::Unlisted("fruit".into())));
}

#[tokio::test]
async fn test_other_rejection_is_an_error() {
    let api = Arc::new(FakePantryApi::new());
    api.fail_next(Endpoint::CreateCatalog, ApiError::rejected(500, "disk full"));
    let controller = CatalogController::new(api.clone(), Arc::new(ScriptedPrompter::new()));
    let mut store = PantryStore::new();

    let draft = CatalogDraft::create(CatalogEntry::new("Leek", Classification::Ingredient));
    let err = controller.save(&mut store, &draft).await.unwrap_err();

    assert!(matches!(err, PantryError::Api(ApiError::Rejected { status: 500, .. })));
}

// ============================================================================
// Recipe save with missing ingredients
// ============================================================================

#[tokio::test]
async fn test_onion_registered_then_retry_keeps_groups() {
    let api = Arc::new(FakePantryApi::new());
    api.seed_catalog("Soy Sauce", Classification::Seasoning, "");
    let prompter = Arc::new(ScriptedPrompter::new());
    prompter.push_classification(Some(Classification::Ingredient));
    let saver = RecipeSaver::new(api.clone(), prompter.clone());
    let mut store = PantryStore::new();

    let draft = RecipeDraft::new(RecipePayload {
        name: "Stir Fry".into(),
        yield_text: "2".into(),
        csv_data: SAUCE_RECIPE.into(),
        ..Default::default()
    });
    let report = saver.save(&mut store, &draft).await.unwrap();

    assert_eq!(
        report.outcome,
        RecipeSaveOutcome::Saved {
            registered: vec!["Onion".into()]
        }
    );
    assert_eq!(
        report.trail,
        vec![
            RecipeSaveState::Submitting,
            RecipeSaveState::PendingRegistration(vec!["Onion".into()]),
            RecipeSaveState::Retrying,
            RecipeSaveState::Saved,
        ]
    );
    assert_eq!(prompter.classified(), vec!["Onion"]);

    let saves = api.calls_to(Endpoint::SaveRecipe);
    assert_eq!(saves.len(), 2);
    assert_eq!(saves[0].body, saves[1].body);

    let onion = api.catalog_by_name("Onion").unwrap();
    assert_eq!(onion.classification, Classification::Ingredient);
    assert!(store.catalog_entry(onion.id).is_some());

    let (recipe, payload) = api.recipe_by_name("Stir Fry").unwrap();
    assert_eq!(payload.yield_text, "2");
    let rows = api.recipe_ingredients(recipe.id).await.unwrap();
    let groups: Vec<(&str, &str)> = rows
        .iter()
        .map(|r| (r.name.as_str(), r.group_name.as_str()))
        .collect();
    assert_eq!(groups, vec![("Onion", ""), ("Soy Sauce", "Sauce")]);
}

#[tokio::test]
async fn test_cancelled_registration_saves_nothing() {
    let api = Arc::new(FakePantryApi::new());
    api.seed_catalog("Soy Sauce", Classification::Seasoning, "");
    let prompter = Arc::new(ScriptedPrompter::new());
    prompter.push_classification(None);
    let saver = RecipeSaver::new(api.clone(), prompter);
    let mut store = PantryStore::new();

    let draft = RecipeDraft::new(RecipePayload {
        name: "Stir Fry".into(),
        csv_data: SAUCE_RECIPE.into(),
        ..Default::default()
    });
    let report = saver.save(&mut store, &draft).await.unwrap();

    assert_eq!(
        report.outcome,
        RecipeSaveOutcome::RegistrationCancelled {
            missing: vec!["Onion".into()]
        }
    );
    assert_eq!(report.trail.last(), Some(&RecipeSaveState::Cancelled));
    assert!(api.calls_to(Endpoint::BulkCreateCatalog).is_empty());
    assert!(api.recipe_by_name("Stir Fry").is_none());
}

#[tokio::test]
async fn test_still_missing_after_registration_is_not_retried_again() {
    let api = Arc::new(FakePantryApi::new());
    api.seed_catalog("Rice", Classification::Ingredient, "g");
    let missing = ApiError::MissingIngredients(vec!["Nori".into()]);
    api.fail_next(Endpoint::SaveRecipe, missing.clone());
    api.fail_next(Endpoint::SaveRecipe, missing);
    let saver = RecipeSaver::new(api.clone(), Arc::new(AssumeYes));
    let mut store = PantryStore::new();

    let draft = RecipeDraft::new(RecipePayload {
        name: "Onigiri".into(),
        csv_data: "Rice,300g".into(),
        ..Default::default()
    });
    let err = saver.save(&mut store, &draft).await.unwrap_err();

    assert!(matches!(err, PantryError::StillMissing(ref names) if names == &["Nori"]));
    assert_eq!(api.calls_to(Endpoint::SaveRecipe).len(), 2);
    assert_eq!(api.calls_to(Endpoint::BulkCreateCatalog).len(), 1);
}

#[tokio::test]
async fn test_case_variant_of_known_name_is_not_registered() {
    let api = Arc::new(FakePantryApi::new());
    api.seed_catalog("Onion", Classification::Ingredient, "pcs");
    let mut onion = api.catalog_by_name("Onion").unwrap();
    onion.kana = Some("tamanegi".into());
    onion.category = Some(Category::Vegetable);
    api.update_catalog_entry(&CatalogWrite {
        entry: onion.clone(),
        force_merge: false,
    })
    .await
    .unwrap();

    let saver = RecipeSaver::new(api.clone(), Arc::new(AssumeYes));
    let mut store = PantryStore::new();
    let draft = RecipeDraft::new(RecipePayload {
        name: "Soup".into(),
        csv_data: "onion,1".into(),
        ..Default::default()
    });
    let err = saver.save(&mut store, &draft).await.unwrap_err();

    assert!(err.is_validation());
    assert!(err.to_string().contains("\"Onion\""));
    assert_eq!(api.calls_to(Endpoint::SaveRecipe).len(), 1);
    assert!(api.calls_to(Endpoint::BulkCreateCatalog).is_empty());
    assert_eq!(api.catalog(), vec![onion]);
    assert!(api.recipe_by_name("Soup").is_none());
}

// ============================================================================
// Stocking missing ingredients
// ============================================================================

#[tokio::test]
async fn test_bulk_add_keeps_successes_when_one_fails() {
    let api = Arc::new(FakePantryApi::new());
    api.seed_location("Fridge");
    api.seed_catalog("Carrot", Classification::Ingredient, "pcs");
    let leek = api.seed_catalog("Leek", Classification::Ingredient, "pcs");
    api.seed_catalog("Egg", Classification::Ingredient, "pcs");
    let recipe = api.seed_recipe("Soup", "Carrot,1\nLeek,1\nEgg,2");
    api.fail_inventory_add_for(leek, ApiError::Transport("connection reset".into()));

    let prompter = Arc::new(ScriptedPrompter::answering(&[true]));
    let coordinator = StockCoordinator::new(api.clone(), prompter.clone(), "Fridge");
    let mut store = PantryStore::new();

    let rows = coordinator.recipe_rows(&mut store, recipe).await.unwrap();
    assert!(rows.iter().all(|r| !r.in_stock));
    let report = coordinator.add_all_missing(&mut store, &rows).await.unwrap();

    assert_eq!(prompter.asked_kinds(), vec!["add_all_to_inventory"]);
    assert_eq!(report.added, vec!["Carrot", "Egg"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "Leek");
    assert!(!report.is_complete());

    assert_eq!(api.inventory().len(), 2);
    assert_eq!(store.inventory().len(), 2);
    for item in api.inventory() {
        assert_eq!(item.amount, Amount::Untracked);
        assert_eq!(item.location, "Fridge");
    }
}

#[tokio::test]
async fn test_bulk_add_declined_writes_nothing() {
    let api = Arc::new(FakePantryApi::new());
    api.seed_catalog("Carrot", Classification::Ingredient, "pcs");
    let recipe = api.seed_recipe("Soup", "Carrot,1");
    let coordinator = StockCoordinator::new(api.clone(), Arc::new(ScriptedPrompter::new()), "Other");
    let mut store = PantryStore::new();

    let rows = coordinator.recipe_rows(&mut store, recipe).await.unwrap();
    let report = coordinator.add_all_missing(&mut store, &rows).await.unwrap();

    assert!(report.declined);
    assert_eq!(api.write_count(), 0);
}

// ============================================================================
// Untracked amounts
// ============================================================================

#[tokio::test]
async fn test_untracked_and_zero_stay_distinct() {
    let api = Arc::new(FakePantryApi::new());
    let milk = api.seed_catalog("Milk", Classification::Ingredient, "L");
    let egg = api.seed_catalog("Egg", Classification::Ingredient, "pcs");
    let milk_item = api.seed_inventory(milk, Amount::Untracked, "Other");
    let egg_item = api.seed_inventory(egg, Amount::Quantity(0.0), "Other");

    let manager = InventoryManager::new(api.clone(), Arc::new(ScriptedPrompter::new()), "Other");
    let mut store = PantryStore::new();
    manager.load(&mut store).await.unwrap();

    let untracked = store.inventory_item(milk_item).unwrap().clone();
    let zero = store.inventory_item(egg_item).unwrap().clone();
    assert_eq!(untracked.amount.display_with_unit("L"), "in stock");
    assert_eq!(zero.amount.display_with_unit("pcs"), "0 pcs");

    let wire = serde_json::to_value(InventoryUpdate::from_item(&untracked)).unwrap();
    assert_eq!(wire["amount"], serde_json::json!(-1.0));
    let wire = serde_json::to_value(InventoryUpdate::from_item(&zero)).unwrap();
    assert_eq!(wire["amount"], serde_json::json!(0.0));

    let err = manager.adjust(&mut store, milk_item, -1.0).await.unwrap_err();
    assert!(matches!(err, PantryError::UntrackedAmount(_)));
    assert!(api.calls_to(Endpoint::UpdateInventory).is_empty());

    let next = manager.adjust(&mut store, egg_item, 2.0).await.unwrap();
    assert_eq!(next, Amount::Quantity(2.0));
    assert!(!store.needs_refresh(Scope::Inventory));
}
