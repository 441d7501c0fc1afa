//! UI state - presentation state separate from domain data

/// Top-level screens, switched with the function keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Browser,
    Console,
    Recipe,
}

impl Screen {
    pub fn all() -> Vec<Screen> {
        vec![Screen::Browser, Screen::Console, Screen::Recipe]
    }

    pub fn name(&self) -> &str {
        match self {
            Screen::Browser => "Browser",
            Screen::Console => "SQL Console",
            Screen::Recipe => "New Recipe",
        }
    }

    pub fn hotkey(&self) -> &str {
        match self {
            Screen::Browser => "F2",
            Screen::Console => "F3",
            Screen::Recipe => "F4",
        }
    }

    pub fn next(&self) -> Screen {
        match self {
            Screen::Browser => Screen::Console,
            Screen::Console => Screen::Recipe,
            Screen::Recipe => Screen::Browser,
        }
    }
}

/// Field focused in the recipe form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Rate,
    Description,
    Tags,
    ImportJson,
    Peoples,
    Ingredients,
    Steps,
    Images,
    Save,
}

impl FormField {
    pub fn all() -> [FormField; 10] {
        [
            FormField::Name,
            FormField::Rate,
            FormField::Description,
            FormField::Tags,
            FormField::ImportJson,
            FormField::Peoples,
            FormField::Ingredients,
            FormField::Steps,
            FormField::Images,
            FormField::Save,
        ]
    }

    pub fn next(&self) -> FormField {
        let all = Self::all();
        let idx = all.iter().position(|f| f == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    pub fn prev(&self) -> FormField {
        let all = Self::all();
        let idx = all.iter().position(|f| f == self).unwrap_or(0);
        all[(idx + all.len() - 1) % all.len()]
    }

}
