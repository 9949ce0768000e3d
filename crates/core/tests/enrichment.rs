use std::fs;
use std::path::Path;
use suggest_core::taxonomy::{Taxonomy, TaxonomyError};
use tempfile::tempdir;

#[test]
fn parses_a_taxonomy_file_and_enriches_categories() {
    let temp = tempdir().unwrap();
    let file = temp.path().join("taxonomy.txt");
    fs::write(
        &file,
        "# Google_Product_Taxonomy_Version: 2021-09-21\n\
         166 - Apparel & Accessories\n\
         1604 - Apparel & Accessories > Clothing\n\
         204 - Apparel & Accessories > Clothing > Dresses\n\
         not a category line\n\
         187 - Apparel & Accessories > Shoes\n",
    )
    .unwrap();

    let taxonomy = Taxonomy::from_file(&file).unwrap();
    assert_eq!(taxonomy.len(), 4);

    let rich = taxonomy.rich_categories_for_embedding(2);
    let apparel = rich.iter().find(|(id, _)| id == "166").unwrap();
    assert!(apparel.1.starts_with("Apparel & Accessories"));
    assert!(apparel.1.contains("Clothing"));
    assert!(apparel.1.contains("Dresses"));
    assert!(apparel.1.contains("Shoes"));

    // Level-3 categories are excluded from the batch but still enrich parents.
    assert!(rich.iter().all(|(id, _)| id != "204"));
}

#[test]
fn missing_source_file_is_a_fatal_error() {
    let err = Taxonomy::from_file(Path::new("/definitely/not/here/taxonomy.txt")).unwrap_err();
    assert!(matches!(err, TaxonomyError::Unreadable { .. }));
}
