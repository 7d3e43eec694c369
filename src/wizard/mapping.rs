use crate::model::{FolderNode, Rule, TemplateMapping};
use std::collections::HashSet;

/// Per-rule template mapping sub-form. Works on a copy; the rule is only touched by [`MappingPanel::save`].
#[derive(Debug, Clone)]
pub struct MappingPanel {
    pub rule_id: String,
    pub rule_name: String,
    pub draft: TemplateMapping,
    pub tree_open: bool,
    expanded: HashSet<String>,
}

impl MappingPanel {
    pub fn open(rule: &Rule) -> Self {
        Self {
            rule_id: rule.id.clone(),
            rule_name: rule.name.clone(),
            draft: rule.template_mapping.clone().unwrap_or_default(),
            tree_open: false,
            expanded: HashSet::new(),
        }
    }

    /// Stores an uploadable node as the destination and collapses the tree. Other nodes are ignored.
    pub fn select_folder(&mut self, node: &FolderNode) -> bool {
        if !node.can_upload {
            return false;
        }
        self.draft.selected_folder = Some(node.clone());
        self.tree_open = false;
        true
    }

    pub fn is_selected(&self, node: &FolderNode) -> bool {
        self.draft
            .selected_folder
            .as_ref()
            .is_some_and(|f| f.path == node.path)
    }

    pub fn toggle_tree(&mut self) {
        self.tree_open = !self.tree_open;
    }

    pub fn toggle_expanded(&mut self, path: &str) {
        if !self.expanded.remove(path) {
            self.expanded.insert(path.to_string());
        }
    }

    pub fn is_expanded(&self, path: &str) -> bool {
        self.expanded.contains(path)
    }

    pub fn can_save(&self) -> bool {
        self.draft.is_complete()
    }

    /// Writes the draft onto the owning rule. Refused until template, client and folder are all set.
    pub fn save(&self, rules: &mut [Rule]) -> bool {
        if !self.can_save() {
            return false;
        }
        match rules.iter_mut().find(|r| r.id == self.rule_id) {
            Some(rule) => {
                rule.template_mapping = Some(self.draft.clone());
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(path: &str, can_upload: bool) -> FolderNode {
        FolderNode {
            folder_name: path.rsplit('\\').next().unwrap_or_default().to_string(),
            path: path.to_string(),
            can_upload,
            ..FolderNode::default()
        }
    }

    fn rule_with_id(id: &str) -> Rule {
        Rule {
            id: id.to_string(),
            name: "Invoices".to_string(),
            all_email: true,
            ..Rule::default()
        }
    }

    #[test]
    fn test_seeds_from_existing_mapping() {
        let mut rule = rule_with_id("1");
        rule.template_mapping = Some(TemplateMapping {
            template: "Template 2".to_string(),
            ..TemplateMapping::default()
        });

        let panel = MappingPanel::open(&rule);
        assert_eq!(panel.draft.template, "Template 2");
        assert!(!panel.tree_open);

        let blank = MappingPanel::open(&rule_with_id("2"));
        assert_eq!(blank.draft, TemplateMapping::default());
    }

    #[test]
    fn test_only_uploadable_nodes_are_selectable() {
        let mut panel = MappingPanel::open(&rule_with_id("1"));
        panel.toggle_tree();

        assert!(!panel.select_folder(&node("\\FO Restricted", false)));
        assert!(panel.draft.selected_folder.is_none());
        assert!(panel.tree_open);

        let leaf = node("\\FO Restricted\\D22. Driving License", true);
        assert!(panel.select_folder(&leaf));
        assert!(panel.is_selected(&leaf));
        assert!(!panel.tree_open);
    }

    fn fill(panel: &mut MappingPanel, field: usize, folder: &FolderNode) {
        match field {
            0 => panel.draft.template = "Template 1".to_string(),
            1 => panel.draft.client_name = "Client A".to_string(),
            _ => {
                panel.select_folder(folder);
            }
        }
    }

    #[test]
    fn test_save_enabled_exactly_when_complete_in_any_order() {
        let folder = node("\\Docs\\Leaf", true);
        let orders = [
            [0, 1, 2],
            [0, 2, 1],
            [1, 0, 2],
            [1, 2, 0],
            [2, 0, 1],
            [2, 1, 0],
        ];

        for order in orders {
            let mut panel = MappingPanel::open(&rule_with_id("1"));
            for (applied, field) in order.into_iter().enumerate() {
                assert!(!panel.can_save(), "enabled after only {} fields", applied);
                fill(&mut panel, field, &folder);
            }
            assert!(panel.can_save());
        }
    }

    #[test]
    fn test_save_merges_into_owning_rule_only() {
        let mut rules = vec![rule_with_id("1"), rule_with_id("2")];
        let mut panel = MappingPanel::open(&rules[1]);
        assert!(!panel.save(&mut rules));
        assert!(rules[1].template_mapping.is_none());

        panel.draft.template = "Template 1".to_string();
        panel.draft.client_name = "Client A".to_string();
        panel.select_folder(&node("\\Docs\\Leaf", true));
        panel.draft.bcc = "audit@acme.com".to_string();

        assert!(panel.save(&mut rules));
        assert!(rules[0].template_mapping.is_none());
        let mapping = rules[1].template_mapping.as_ref().unwrap();
        assert_eq!(mapping.bcc, "audit@acme.com");
        assert_eq!(mapping.selected_folder.as_ref().unwrap().path, "\\Docs\\Leaf");
    }

    #[test]
    fn test_expansion_toggles() {
        let mut panel = MappingPanel::open(&rule_with_id("1"));
        assert!(!panel.is_expanded("\\A"));
        panel.toggle_expanded("\\A");
        assert!(panel.is_expanded("\\A"));
        panel.toggle_expanded("\\A");
        assert!(!panel.is_expanded("\\A"));
    }
}
