use rbstep::constants::DEFAULT_MAX_LEVELS;
use rbstep::{Color, FixupAction, RedBlackTree, Slot, Subtree, TreeConfig, TreeError};

/// Tree over the classic domain built synchronously, then switched to
/// explain mode.
fn explaining(values: &[u32]) -> anyhow::Result<RedBlackTree<u32>> {
    let mut tree: RedBlackTree<u32> = RedBlackTree::with_config(TreeConfig::classic());
    for value in values {
        tree.insert(*value)?;
    }
    tree.set_explain(true);
    Ok(tree)
}

/// Applies signed operations, positive inserts and negative deletes, then
/// returns every title the last one paused on.
fn walkthrough(operations: &[i32]) -> anyhow::Result<Vec<String>> {
    let (last, setup): (&i32, &[i32]) = operations
        .split_last()
        .ok_or_else(|| anyhow::anyhow!("no operations"))?;
    let mut tree: RedBlackTree<u32> = RedBlackTree::with_config(TreeConfig::classic());
    for operation in setup {
        apply(&mut tree, *operation)?;
    }
    tree.set_explain(true);
    apply(&mut tree, *last)?;

    let mut titles: Vec<String> = Vec::new();
    while let Some(action) = tree.pending().copied() {
        titles.push(action.title());
        tree.resume()?;
    }
    assert!(tree.snapshot().is_valid_red_black());
    Ok(titles)
}

fn apply(tree: &mut RedBlackTree<u32>, operation: i32) -> anyhow::Result<()> {
    if operation > 0 {
        tree.insert(operation as u32)?;
    } else {
        tree.delete(&(-operation as u32))?;
    }
    Ok(())
}

#[test]
fn insert_walkthroughs() -> anyhow::Result<()> {
    assert_eq!(walkthrough(&[500])?, vec!["Turn Root Black"]);
    assert_eq!(
        walkthrough(&[500, 750])?,
        vec!["No Additional Action Required"]
    );
    assert_eq!(
        walkthrough(&[500, 750, 875])?[0],
        "Red Alert - Left Rotate and Swap Colors"
    );
    assert_eq!(
        walkthrough(&[500, 250, 125])?[0],
        "Red Alert - Right Rotate and Swap Colors"
    );
    assert_eq!(
        walkthrough(&[500, 750, 625])?[0],
        "Red Alert - Right Rotate Red Pair to Outside"
    );
    assert_eq!(
        walkthrough(&[500, 250, 375])?[0],
        "Red Alert - Left Rotate Red Pair to Outside"
    );
    assert_eq!(
        walkthrough(&[500, 250, 750, 625])?[0],
        "Red Alert - Recolor and Move Up"
    );
    Ok(())
}

#[test]
fn delete_walkthroughs() -> anyhow::Result<()> {
    let cases: Vec<(Vec<i32>, &str)> = vec![
        (vec![500, -500], "No Additional Action Required"),
        (vec![500, 750, -750], "Simply Remove the Red Node"),
        (
            vec![500, 750, -500],
            "Replace Parent with Red Child Turned Black",
        ),
        (
            vec![500, 250, 750, -500],
            "Replace Value with In-Order Predecessor to Get One Child",
        ),
        (
            vec![500, 250, 750, 125, 375, 62, -750],
            "Lack of Black - Right Rotate and Swap Colors to Get Black Sibling",
        ),
        (
            vec![500, 250, 750, 625, 875, 562, -250],
            "Lack of Black - Left Rotate and Swap Colors to Get Black Sibling",
        ),
        (
            vec![500, 250, 750, 875, -250],
            "Lack of Black - Left Rotate and Color New Children Black",
        ),
        (
            vec![500, 250, 750, 125, -750],
            "Lack of Black - Right Rotate and Color New Children Black",
        ),
        (
            vec![500, 250, 750, 625, -250],
            "Lack of Black - Right Rotate and Swap Colors to Get Outside Red",
        ),
        (
            vec![500, 250, 750, 375, -750],
            "Lack of Black - Left Rotate and Swap Colors to Get Outside Red",
        ),
        (
            vec![500, 250, 750, 625, 875, 937, -937, -875],
            "Lack of Black - Swap Colors of Parent and Sibling",
        ),
        (
            vec![500, 250, 750, 875, -875, -750],
            "Lack of Black - Color Sibling Red and Move Up",
        ),
    ];
    for (operations, title) in cases {
        assert_eq!(walkthrough(&operations)?[0], title, "{operations:?}");
    }
    Ok(())
}

#[test]
fn paused_tree_stays_searchable() -> anyhow::Result<()> {
    let mut tree: RedBlackTree<u32> = explaining(&[500, 250, 750])?;
    tree.insert(625)?;

    // Mid-fixup the double red is visible but order and links are intact.
    assert!(tree.is_paused());
    assert!(tree.contains(&625));
    assert_eq!(tree.len(), 4);
    let snapshot: Subtree<u32> = tree.snapshot();
    assert!(snapshot.has_double_red());
    assert_eq!(snapshot.values_in_order(), vec![250, 500, 625, 750]);

    tree.resume()?;
    tree.resume()?;
    assert!(!tree.is_paused());
    assert!(tree.snapshot().is_valid_red_black());
    Ok(())
}

#[test]
fn paused_delete_never_shows_a_value_twice() -> anyhow::Result<()> {
    let mut tree: RedBlackTree<u32> = explaining(&[500, 250, 750, 125, 375, 625, 875])?;
    tree.delete(&500)?;

    match tree.pending().copied() {
        Some(FixupAction::ReplaceWithPredecessor { .. }) => {}
        other => anyhow::bail!("unexpected first step {other:?}"),
    }
    tree.resume()?;
    let values: Vec<u32> = tree.snapshot().values_in_order();
    assert_eq!(values, vec![125, 250, 375, 625, 750, 875]);
    tree.finish();
    assert!(tree.snapshot().is_valid_red_black());
    Ok(())
}

#[test]
fn rejected_while_paused() -> anyhow::Result<()> {
    let mut tree: RedBlackTree<u32> = explaining(&[])?;
    tree.insert(500)?;
    assert_eq!(tree.insert(250), Err(TreeError::OperationPending));
    assert_eq!(tree.delete(&500), Err(TreeError::OperationPending));
    assert_eq!(tree.resume(), Ok(None));
    assert_eq!(tree.resume(), Err(TreeError::NothingPending));
    Ok(())
}

#[test]
fn explain_and_synchronous_agree() -> anyhow::Result<()> {
    let operations: [i32; 14] = [
        500, 250, 750, 125, 375, 625, 875, 62, 937, -500, -62, -875, 100, -750,
    ];
    let mut synchronous: RedBlackTree<u32> = RedBlackTree::with_config(TreeConfig::classic());
    let mut stepped: RedBlackTree<u32> = explaining(&[])?;
    for operation in operations {
        apply(&mut synchronous, operation)?;
        apply(&mut stepped, operation)?;
        while stepped.is_paused() {
            stepped.resume()?;
        }
        assert_eq!(synchronous.snapshot(), stepped.snapshot());
    }
    Ok(())
}

#[test]
fn level_order_slots_drive_inserts() -> anyhow::Result<()> {
    let mut tree: RedBlackTree<u32> = RedBlackTree::with_config(TreeConfig::classic());
    let mut inserted: Vec<u32> = Vec::new();
    // Always fill the leftmost empty slot of the first row that has one.
    for _ in 0..6 {
        let rows: Vec<Vec<Slot<u32>>> = tree.level_order(DEFAULT_MAX_LEVELS);
        let slot: u32 = rows
            .iter()
            .flatten()
            .find_map(|slot| match slot {
                Slot::Sentinel { index, .. } => Some(*index),
                _ => None,
            })
            .ok_or_else(|| anyhow::anyhow!("no empty slot"))?;
        inserted.push(tree.insert_at(slot)?);
    }
    assert_eq!(inserted, vec![500, 250, 750, 125, 375, 625]);

    let root: Slot<u32> = tree.level_order(1)[0][0];
    assert_eq!(root.node().map(|view| view.color), Some(Color::Black));
    assert!(tree.snapshot().is_valid_red_black());
    Ok(())
}
