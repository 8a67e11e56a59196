//! Immutable catalog snapshot
//!
//! Records live in insertion-ordered vectors addressed through id slots.
//! The category tree is an arena keyed by id with the parent stored as an
//! optional id; the Product <-> Tag join is an explicit pair list plus two
//! index maps built once per snapshot.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use uuid::Uuid;

use super::errors::{CatalogError, CatalogResult};
use super::types::{Category, Product, ProductTag, Supplier, Tag};

/// A consistent snapshot of every record the engine reads
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    product_slots: HashMap<Uuid, usize>,
    tags: Vec<Tag>,
    tag_slots: HashMap<Uuid, usize>,
    suppliers: Vec<Supplier>,
    supplier_slots: HashMap<Uuid, usize>,
    categories: Vec<Category>,
    category_slots: HashMap<Uuid, usize>,
    children: HashMap<Uuid, Vec<Uuid>>,
    product_tags: Vec<ProductTag>,
    linked: HashSet<ProductTag>,
    tags_by_product: HashMap<Uuid, Vec<Uuid>>,
    products_by_tag: HashMap<Uuid, Vec<Uuid>>,
}

impl Catalog {
    /// Starts an empty builder
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    // Products

    /// Products in snapshot order
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn product(&self, id: Uuid) -> Option<&Product> {
        self.product_slots.get(&id).map(|&slot| &self.products[slot])
    }

    // Tags

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn tag(&self, id: Uuid) -> Option<&Tag> {
        self.tag_slots.get(&id).map(|&slot| &self.tags[slot])
    }

    /// Tags attached to a product, in attachment order
    pub fn tags_of(&self, product_id: Uuid) -> Vec<&Tag> {
        self.tags_by_product
            .get(&product_id)
            .map(|ids| ids.iter().filter_map(|id| self.tag(*id)).collect())
            .unwrap_or_default()
    }

    /// Products carrying a tag, in attachment order
    pub fn products_with_tag(&self, tag_id: Uuid) -> Vec<&Product> {
        self.products_by_tag
            .get(&tag_id)
            .map(|ids| ids.iter().filter_map(|id| self.product(*id)).collect())
            .unwrap_or_default()
    }

    /// Number of distinct tags attached to a product
    pub fn distinct_tag_count(&self, product_id: Uuid) -> usize {
        self.tags_by_product
            .get(&product_id)
            .map(|ids| ids.iter().collect::<HashSet<_>>().len())
            .unwrap_or(0)
    }

    pub fn product_tags(&self) -> &[ProductTag] {
        &self.product_tags
    }

    // Suppliers

    pub fn suppliers(&self) -> &[Supplier] {
        &self.suppliers
    }

    pub fn supplier(&self, id: Uuid) -> Option<&Supplier> {
        self.supplier_slots.get(&id).map(|&slot| &self.suppliers[slot])
    }

    // Categories

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, id: Uuid) -> Option<&Category> {
        self.category_slots.get(&id).map(|&slot| &self.categories[slot])
    }

    pub fn parent(&self, id: Uuid) -> Option<&Category> {
        self.category(id)?.parent_id.and_then(|p| self.category(p))
    }

    pub fn children(&self, id: Uuid) -> Vec<&Category> {
        self.children
            .get(&id)
            .map(|ids| ids.iter().filter_map(|c| self.category(*c)).collect())
            .unwrap_or_default()
    }

    /// The category `levels` steps above `id` (0 is `id` itself).
    ///
    /// Returns None when the chain is shorter than `levels`. A revisited id
    /// stops the walk.
    pub fn ancestor_at(&self, id: Uuid, levels: usize) -> Option<&Category> {
        let mut current = self.category(id)?;
        let mut visited = HashSet::from([current.id]);
        for _ in 0..levels {
            let parent = self.category(current.parent_id?)?;
            if !visited.insert(parent.id) {
                return None;
            }
            current = parent;
        }
        Some(current)
    }

    /// Ancestors of `id`, nearest first
    pub fn ancestors(&self, id: Uuid) -> Vec<&Category> {
        let mut chain = Vec::new();
        let mut visited = HashSet::from([id]);
        let mut next = self.category(id).and_then(|c| c.parent_id);
        while let Some(parent_id) = next {
            if !visited.insert(parent_id) {
                break;
            }
            match self.category(parent_id) {
                Some(parent) => {
                    chain.push(parent);
                    next = parent.parent_id;
                }
                None => break,
            }
        }
        chain
    }

    /// Number of ancestors above `id` (roots are depth 0)
    pub fn depth(&self, id: Uuid) -> usize {
        self.ancestors(id).len()
    }

    // Mutation guards

    /// Moves a category under a new parent (or to the root).
    ///
    /// Rejects any assignment that would make the category its own ancestor.
    pub fn reparent_category(&mut self, id: Uuid, parent: Option<Uuid>) -> CatalogResult<()> {
        let slot = *self.category_slots.get(&id).ok_or(CatalogError::DanglingReference {
            kind: "category",
            id,
            referrer: id,
        })?;

        if let Some(parent_id) = parent {
            if self.category(parent_id).is_none() {
                return Err(CatalogError::DanglingReference {
                    kind: "category",
                    id: parent_id,
                    referrer: id,
                });
            }
            if self.creates_cycle(id, parent_id) {
                return Err(CatalogError::CategoryCycle { id, parent: parent_id });
            }
        }

        if let Some(old_parent) = self.categories[slot].parent_id {
            if let Some(siblings) = self.children.get_mut(&old_parent) {
                siblings.retain(|c| *c != id);
            }
        }
        self.categories[slot].parent_id = parent;
        if let Some(parent_id) = parent {
            self.children.entry(parent_id).or_default().push(id);
        }
        Ok(())
    }

    /// Attaches a tag to a product; a pair may exist only once
    pub fn attach_tag(&mut self, product_id: Uuid, tag_id: Uuid) -> CatalogResult<()> {
        if self.product(product_id).is_none() {
            return Err(CatalogError::DanglingReference {
                kind: "product",
                id: product_id,
                referrer: tag_id,
            });
        }
        if self.tag(tag_id).is_none() {
            return Err(CatalogError::DanglingReference {
                kind: "tag",
                id: tag_id,
                referrer: product_id,
            });
        }
        let link = ProductTag { product_id, tag_id };
        if !self.linked.insert(link) {
            return Err(CatalogError::DuplicateProductTag { product_id, tag_id });
        }
        self.product_tags.push(link);
        self.tags_by_product.entry(product_id).or_default().push(tag_id);
        self.products_by_tag.entry(tag_id).or_default().push(product_id);
        Ok(())
    }

    /// Removes a tag association; returns whether it existed
    pub fn detach_tag(&mut self, product_id: Uuid, tag_id: Uuid) -> bool {
        let link = ProductTag { product_id, tag_id };
        if !self.linked.remove(&link) {
            return false;
        }
        self.product_tags.retain(|l| *l != link);
        if let Some(ids) = self.tags_by_product.get_mut(&product_id) {
            ids.retain(|t| *t != tag_id);
        }
        if let Some(ids) = self.products_by_tag.get_mut(&tag_id) {
            ids.retain(|p| *p != product_id);
        }
        true
    }

    /// True if giving `id` the parent `parent` would close a loop
    fn creates_cycle(&self, id: Uuid, parent: Uuid) -> bool {
        if id == parent {
            return true;
        }
        let mut visited = HashSet::new();
        let mut next = Some(parent);
        while let Some(current) = next {
            if current == id {
                return true;
            }
            if !visited.insert(current) {
                // Pre-existing loop that does not involve `id`
                return true;
            }
            next = self.category(current).and_then(|c| c.parent_id);
        }
        false
    }
}

/// Assembles a [`Catalog`], enforcing id uniqueness, reference integrity,
/// the tree invariant and the unique join pair.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    catalog: Catalog,
    links: Vec<ProductTag>,
    queued: HashSet<ProductTag>,
}

impl CatalogBuilder {
    pub fn tag(&mut self, tag: Tag) -> CatalogResult<&mut Self> {
        insert_unique(&mut self.catalog.tag_slots, &mut self.catalog.tags, "tag", tag.id, tag)?;
        Ok(self)
    }

    pub fn supplier(&mut self, supplier: Supplier) -> CatalogResult<&mut Self> {
        let score = supplier.reliability_score;
        if score < Decimal::ONE || score > Decimal::TEN {
            return Err(CatalogError::InvalidField {
                field: "reliabilityScore",
                id: supplier.id,
                reason: format!("{} outside 1.0 - 10.0", score),
            });
        }
        insert_unique(
            &mut self.catalog.supplier_slots,
            &mut self.catalog.suppliers,
            "supplier",
            supplier.id,
            supplier,
        )?;
        Ok(self)
    }

    pub fn category(&mut self, category: Category) -> CatalogResult<&mut Self> {
        insert_unique(
            &mut self.catalog.category_slots,
            &mut self.catalog.categories,
            "category",
            category.id,
            category,
        )?;
        Ok(self)
    }

    pub fn product(&mut self, product: Product) -> CatalogResult<&mut Self> {
        if product.price < Decimal::ZERO {
            return Err(CatalogError::InvalidField {
                field: "price",
                id: product.id,
                reason: "must be >= 0".into(),
            });
        }
        if product.quantity < 0 {
            return Err(CatalogError::InvalidField {
                field: "quantity",
                id: product.id,
                reason: "must be >= 0".into(),
            });
        }
        if product.total_value().is_none() {
            return Err(CatalogError::InvalidField {
                field: "total_value",
                id: product.id,
                reason: format!("{} * {} overflows", product.price, product.quantity),
            });
        }
        insert_unique(
            &mut self.catalog.product_slots,
            &mut self.catalog.products,
            "product",
            product.id,
            product,
        )?;
        Ok(self)
    }

    /// Queues a Product <-> Tag link; both ends are checked at build time
    pub fn link(&mut self, product_id: Uuid, tag_id: Uuid) -> CatalogResult<&mut Self> {
        let link = ProductTag { product_id, tag_id };
        if !self.queued.insert(link) {
            return Err(CatalogError::DuplicateProductTag { product_id, tag_id });
        }
        self.links.push(link);
        Ok(self)
    }

    /// Validates references and the tree, then builds the join indexes
    pub fn build(self) -> CatalogResult<Catalog> {
        let CatalogBuilder { mut catalog, links, .. } = self;

        for product in &catalog.products {
            if let Some(category_id) = product.category_id {
                if catalog.category(category_id).is_none() {
                    return Err(CatalogError::DanglingReference {
                        kind: "category",
                        id: category_id,
                        referrer: product.id,
                    });
                }
            }
            if let Some(supplier_id) = product.supplier_id {
                if catalog.supplier(supplier_id).is_none() {
                    return Err(CatalogError::DanglingReference {
                        kind: "supplier",
                        id: supplier_id,
                        referrer: product.id,
                    });
                }
            }
        }

        let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for category in &catalog.categories {
            if let Some(parent_id) = category.parent_id {
                if catalog.category(parent_id).is_none() {
                    return Err(CatalogError::DanglingReference {
                        kind: "category",
                        id: parent_id,
                        referrer: category.id,
                    });
                }
                if catalog.creates_cycle(category.id, parent_id) {
                    return Err(CatalogError::CategoryCycle {
                        id: category.id,
                        parent: parent_id,
                    });
                }
                children.entry(parent_id).or_default().push(category.id);
            }
        }
        catalog.children = children;

        for link in links {
            catalog.attach_tag(link.product_id, link.tag_id)?;
        }

        Ok(catalog)
    }
}

fn insert_unique<T>(
    slots: &mut HashMap<Uuid, usize>,
    records: &mut Vec<T>,
    kind: &'static str,
    id: Uuid,
    record: T,
) -> CatalogResult<()> {
    if slots.contains_key(&id) {
        return Err(CatalogError::DuplicateId { kind, id });
    }
    slots.insert(id, records.len());
    records.push(record);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> (Catalog, Category, Category, Category) {
        let root = Category::root("Electronics");
        let mid = Category::child_of("Smartphones", &root);
        let leaf = Category::child_of("Android", &mid);

        let mut builder = Catalog::builder();
        builder
            .category(root.clone())
            .unwrap()
            .category(mid.clone())
            .unwrap()
            .category(leaf.clone())
            .unwrap();
        (builder.build().unwrap(), root, mid, leaf)
    }

    #[test]
    fn test_ancestor_walk() {
        let (catalog, root, mid, leaf) = tree();

        assert_eq!(catalog.ancestor_at(leaf.id, 0).unwrap().id, leaf.id);
        assert_eq!(catalog.ancestor_at(leaf.id, 1).unwrap().id, mid.id);
        assert_eq!(catalog.ancestor_at(leaf.id, 2).unwrap().id, root.id);
        assert!(catalog.ancestor_at(leaf.id, 3).is_none());
        assert!(catalog.ancestor_at(mid.id, 2).is_none());
        assert_eq!(catalog.depth(leaf.id), 2);
        assert_eq!(catalog.depth(root.id), 0);
    }

    #[test]
    fn test_children_index() {
        let (catalog, root, mid, _) = tree();
        let children = catalog.children(root.id);
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, mid.id);
    }

    #[test]
    fn test_reparent_rejects_cycle() {
        let (mut catalog, root, _, leaf) = tree();

        let result = catalog.reparent_category(root.id, Some(leaf.id));
        assert_eq!(
            result,
            Err(CatalogError::CategoryCycle {
                id: root.id,
                parent: leaf.id
            })
        );
        // Tree unchanged
        assert!(catalog.category(root.id).unwrap().parent_id.is_none());

        let result = catalog.reparent_category(root.id, Some(root.id));
        assert!(matches!(result, Err(CatalogError::CategoryCycle { .. })));
    }

    #[test]
    fn test_reparent_moves_children_index() {
        let (mut catalog, root, mid, leaf) = tree();

        catalog.reparent_category(leaf.id, Some(root.id)).unwrap();
        assert_eq!(catalog.children(root.id).len(), 2);
        assert!(catalog.children(mid.id).is_empty());
        assert_eq!(catalog.depth(leaf.id), 1);

        catalog.reparent_category(leaf.id, None).unwrap();
        assert_eq!(catalog.depth(leaf.id), 0);
    }

    #[test]
    fn test_build_rejects_cycle() {
        let mut a = Category::root("A");
        let b = Category::child_of("B", &a);
        a.parent_id = Some(b.id);

        let mut builder = Catalog::builder();
        builder.category(a).unwrap().category(b).unwrap();
        assert!(matches!(
            builder.build(),
            Err(CatalogError::CategoryCycle { .. })
        ));
    }

    #[test]
    fn test_duplicate_link_rejected() {
        let tag = Tag::new("premium");
        let product = Product::new("Phone", Decimal::TEN, 1);

        let mut builder = Catalog::builder();
        builder
            .tag(tag.clone())
            .unwrap()
            .product(product.clone())
            .unwrap()
            .link(product.id, tag.id)
            .unwrap();
        let result = builder.link(product.id, tag.id);
        assert!(matches!(
            result,
            Err(CatalogError::DuplicateProductTag { .. })
        ));

        let mut catalog = builder.build().unwrap();
        assert_eq!(
            catalog.attach_tag(product.id, tag.id),
            Err(CatalogError::DuplicateProductTag {
                product_id: product.id,
                tag_id: tag.id
            })
        );
    }

    #[test]
    fn test_join_indexes() {
        let premium = Tag::new("premium");
        let compact = Tag::new("compact");
        let phone = Product::new("Phone", Decimal::TEN, 1);
        let case = Product::new("Case", Decimal::ONE, 5);

        let mut builder = Catalog::builder();
        builder
            .tag(premium.clone())
            .unwrap()
            .tag(compact.clone())
            .unwrap()
            .product(phone.clone())
            .unwrap()
            .product(case.clone())
            .unwrap()
            .link(phone.id, premium.id)
            .unwrap()
            .link(phone.id, compact.id)
            .unwrap()
            .link(case.id, compact.id)
            .unwrap();
        let mut catalog = builder.build().unwrap();

        assert_eq!(catalog.distinct_tag_count(phone.id), 2);
        assert_eq!(catalog.distinct_tag_count(case.id), 1);
        assert_eq!(catalog.products_with_tag(compact.id).len(), 2);
        assert_eq!(catalog.tags_of(phone.id)[0].name, "premium");

        assert!(catalog.detach_tag(phone.id, premium.id));
        assert!(!catalog.detach_tag(phone.id, premium.id));
        assert_eq!(catalog.distinct_tag_count(phone.id), 1);
        assert!(catalog.products_with_tag(premium.id).is_empty());
    }

    #[test]
    fn test_dangling_references_rejected() {
        let orphan_category = Category::root("Ghost");
        let product = Product::new("Phone", Decimal::TEN, 1).with_category(&orphan_category);

        let mut builder = Catalog::builder();
        builder.product(product).unwrap();
        assert!(matches!(
            builder.build(),
            Err(CatalogError::DanglingReference { kind: "category", .. })
        ));
    }

    #[test]
    fn test_field_domains_enforced() {
        let mut builder = Catalog::builder();
        let negative = Product::new("Broken", Decimal::NEGATIVE_ONE, 1);
        assert!(matches!(
            builder.product(negative),
            Err(CatalogError::InvalidField { field: "price", .. })
        ));

        let supplier = Supplier::new("Acme", "Germany", Decimal::new(105, 1));
        assert!(matches!(
            builder.supplier(supplier),
            Err(CatalogError::InvalidField { field: "reliabilityScore", .. })
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let tag = Tag::new("premium");
        let mut builder = Catalog::builder();
        builder.tag(tag.clone()).unwrap();
        assert!(matches!(
            builder.tag(tag),
            Err(CatalogError::DuplicateId { kind: "tag", .. })
        ));
    }
}
