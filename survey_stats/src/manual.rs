/*!

This is the long-form manual for `survey_stats` and `mashov`.

## The survey export

The answers are expected as an Excel (.xlsx) file, as produced by Google Forms or
Microsoft Forms: the first row holds the questions, every other row is one respondent.
Unless a worksheet is named in the configuration, the first worksheet is read.

One column names the subject of the answer (the person being rated). Annotations in
parentheses are removed, so `Dana (deputy)` and `Dana` are the same subject. Rows
without a subject and fully empty rows are dropped.

Column names must match the configuration exactly. Missing columns stop the run before
anything is computed; extra columns are reported and ignored.

## Configuration file

Every survey form is described by one JSON file. Paths are relative to that file.

```json
{
  "outputSettings": {
    "reportName": "Feedback spring cohort",
    "outputDirectory": "out",
    "templatePath": "template.docx",
    "generateExport": true,
    "generateCharts": true
  },
  "inputFile": { "filePath": "answers.xlsx" },
  "subject": { "column": "Commander name", "label": "Commander" },
  "generalRating": { "column": "Overall rating" },
  "numericSections": [
    {
      "label": "Professional",
      "prefix": "professional",
      "ignoredValue": 0,
      "questions": [
        { "column": "Knows the material", "shortLabel": "Knowledge" },
        { "column": "Explains clearly" }
      ]
    }
  ],
  "multipleChoice": [
    {
      "column": "Which statements describe your commander?",
      "prefix": "command",
      "options": ["Decisive, confident", "Motivating", "None of these"],
      "noneOption": "None of these"
    }
  ],
  "openText": [
    { "column": "What should be kept?", "bulletKey": "conserve_command" }
  ],
  "rules": { "minSample": 4, "decimals": 2 }
}
```

### `rules`

| key                 | default                       |                                                  |
|---------------------|-------------------------------|--------------------------------------------------|
| `minSample`         | 4                             | below this, means and stds are not reported      |
| `decimals`          | 2                             | rounding of means, stds and percentages          |
| `tooFewAnswersText` | `fewer than <minSample> answers` | displayed instead of a mean or a std          |
| `minCommentLength`  | 2                             | shorter comments are dropped                     |
| `delimiter`         | `,`                           | separates the selected options of a cell         |
| `matchMode`         | `delimited`                   | `delimited` or `contains`                        |
| `punctuation`       | `,."\-:;()!?+/`               | characters pinned right-to-left in comments      |

In `delimited` mode, the options are recognized at delimiter boundaries, longest first:
an option may itself contain the delimiter. In `contains` mode, an option is selected
when its text appears anywhere in the cell. Use it only when the options do not contain
each other.

### The none option

Every multiple-choice question lists a "none of the above" option. A respondent counts
for it only when no other option of the question is selected in the same answer.
All the questions must have the same number of options.

## Placeholders

The template is a .docx file. Any paragraph, table cell, header or footer may contain
`{{name}}` tokens, including tokens that span several formatting runs.

| placeholder                   | value                                               |
|-------------------------------|-----------------------------------------------------|
| `name`                        | the subject                                         |
| `number_answers`              | the number of answers about the subject             |
| `average_general`, `std_general` | the general rating of the subject                |
| `total_general`               | the general rating of the cohort                    |
| `mean_<prefix>_<i>`, `std_<prefix>_<i>` | question `i` of a numeric section         |
| `cohort_mean_<prefix>_<i>`    | question `i` of a numeric section, cohort           |
| `percent_<prefix>_<i>`        | option `i` of a multiple-choice question            |
| `total_<prefix>_<i>`          | option `i` of a multiple-choice question, cohort    |
| `<bulletKey>`                 | the comments of an open-text column                 |

Questions and options are numbered from 1 in configuration order.

A bullet list placeholder must be alone in its paragraph. The paragraph is repeated for
every comment, keeping its formatting (bullets, indentation). Without comments the
paragraph is removed.

A subject with a placeholder that could not be computed (an empty text or a number
that is not finite) is skipped with a warning; the other subjects are still processed.

## Outputs

For every subject, in the output directory:
* `<subject>.docx` the filled template
* `<subject>.xlsx` with a `Quantitative` and a `Textual` sheet (if `generateExport`)
* `<subject>_charts.json` one bar chart description per numeric section (if `generateCharts`)

The summary of all the computed values is written as JSON to the path given with `--out`
(or printed with `--out stdout`). With `--reference`, the summary is compared with an
expected one and the run fails on any difference.

*/
